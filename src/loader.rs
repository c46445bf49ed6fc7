// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{Error, Result};
use std::{fs::File, io::Read, path::Path};

/// Reads the whole file into an owned buffer.
///
/// The buffer is reserved up front from the file size.
///
/// # Errors
///
/// Returns [`Error::NoArguments`] for an empty path,
/// [`Error::UnableToOpenFile`] if the file cannot be read and
/// [`Error::AllocFailed`] if the buffer cannot be reserved.
pub fn read_buffer<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();

    if path.as_os_str().is_empty() {
        return Err(Error::NoArguments);
    }

    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();

    let mut buffer = Vec::new();
    buffer.try_reserve_exact(usize::try_from(file_size).map_err(|_| Error::AllocFailed)?)?;

    file.read_to_end(&mut buffer)?;

    log::debug!("Loaded {} bytes from {}", buffer.len(), path.display());

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_log::test;

    #[test]
    fn loader_reads_whole_file() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("text.txt");

        {
            let mut file = File::create(&path)?;
            write!(file, "hello world")?;
        }

        assert_eq!(b"hello world".to_vec(), read_buffer(&path)?);

        Ok(())
    }

    #[test]
    fn loader_empty_path() {
        assert!(matches!(read_buffer(""), Err(Error::NoArguments)));
    }

    #[test]
    fn loader_missing_file() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("does-not-exist.txt");

        assert!(matches!(read_buffer(path), Err(Error::UnableToOpenFile(_))));

        Ok(())
    }
}
