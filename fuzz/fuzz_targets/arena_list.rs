#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use word_index::{ArenaList, Error};

#[derive(Arbitrary, Debug)]
enum Op {
    PushBack(Vec<u8>),
    Insert(u8, Vec<u8>),
    Remove(u8),
    PopFront,
    PopBack,
    Search(Vec<u8>),
    Linearize,
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);

    let Ok(capacity) = u8::arbitrary(&mut unstructured) else {
        return;
    };
    let Ok(growable) = bool::arbitrary(&mut unstructured) else {
        return;
    };
    let Ok(ops) = <Vec<Op> as Arbitrary>::arbitrary(&mut unstructured) else {
        return;
    };

    let capacity = usize::from(capacity).max(1);

    let mut list = if growable {
        ArenaList::growable(capacity).unwrap()
    } else {
        ArenaList::with_capacity(capacity).unwrap()
    };

    // logical order mirror
    let mut model: Vec<(usize, Vec<u8>)> = vec![];

    for op in ops {
        match op {
            Op::PushBack(value) => match list.push_back(&value) {
                Ok(idx) => model.push((idx, value)),
                Err(Error::ListFull) => assert!(!growable && model.len() == capacity),
                Err(e) => panic!("push_back failed: {e}"),
            },
            Op::Insert(pos, value) => {
                let pos = usize::from(pos);

                let Some(after) = model.get(pos).map(|(idx, _)| *idx) else {
                    assert!(list.insert(list.capacity() + pos, &value).is_err());
                    continue;
                };

                match list.insert(after, &value) {
                    Ok(idx) => model.insert(pos + 1, (idx, value)),
                    Err(Error::ListFull) => assert!(!growable),
                    Err(e) => panic!("insert failed: {e}"),
                }
            }
            Op::Remove(pos) => {
                let pos = usize::from(pos);

                if pos < model.len() {
                    let (idx, expected) = model.remove(pos);
                    assert_eq!(&*expected, &*list.remove(idx).unwrap());
                } else {
                    assert!(list.remove(list.capacity() + pos).is_err());
                }
            }
            Op::PopFront => {
                if model.is_empty() {
                    assert!(matches!(list.pop_front(), Err(Error::NothingToRemove)));
                } else {
                    let (_, expected) = model.remove(0);
                    assert_eq!(&*expected, &*list.pop_front().unwrap());
                }
            }
            Op::PopBack => match model.pop() {
                Some((_, expected)) => assert_eq!(&*expected, &*list.pop_back().unwrap()),
                None => assert!(matches!(list.pop_back(), Err(Error::NothingToRemove))),
            },
            Op::Search(value) => {
                let expected = model.iter().find(|(_, v)| *v == value).map(|(idx, _)| *idx);
                assert_eq!(expected, list.search(&value));
                assert_eq!(expected, list.search_batched(&value));
            }
            Op::Linearize => {
                list.linearize().unwrap();
                model = model.into_iter().map(|(_, v)| v).enumerate().collect();
            }
        }

        list.verify().unwrap();
        assert_eq!(model.len(), list.len());
    }

    let actual: Vec<(usize, Vec<u8>)> = list.iter().map(|(idx, v)| (idx, v.to_vec())).collect();
    assert_eq!(model, actual);
});
