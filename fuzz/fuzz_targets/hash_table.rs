#![no_main]
use libfuzzer_sys::fuzz_target;
use word_index::{hash::Crc32, tokenizer, Config, HashKind};

fuzz_target!(|data: &[u8]| {
    let mut fast = Config::new()
        .bucket_count(13)
        .bucket_capacity(2)
        .open_fast()
        .unwrap();
    let count = fast.fill_from_buffer(data).unwrap();
    assert_eq!(count, fast.len());
    fast.verify().unwrap();

    for kind in HashKind::ALL {
        let hasher = kind.build();

        let mut table = Config::new()
            .bucket_count(13)
            .bucket_capacity(2)
            .open()
            .unwrap();
        assert_eq!(count, table.fill_from_buffer(data, hasher.as_ref()).unwrap());
        table.verify().unwrap();

        for word in tokenizer::words(data) {
            assert!(table.contains(word, hasher.as_ref()));
        }
    }

    let crc = Crc32::new();

    for word in tokenizer::words(data) {
        let bucket = crc.checksum(word) as usize % 13;
        assert!(fast.search(word).is_some_and(|loc| loc.bucket == bucket));
        assert!(fast.remove(word).unwrap());
    }

    assert!(fast.is_empty());
    fast.verify().unwrap();
});
