//! Full content comparison of two files.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use treemirror_core::MirrorError;

/// Read buffer size for each side of a comparison.
const COMPARE_CHUNK_SIZE: usize = 64 * 1024;

/// Check whether two files have identical bytes.
///
/// Sizes are compared first; equal sizes are then compared chunk by chunk,
/// stopping at the first difference. Timestamps are never consulted.
pub fn files_equal(left: &Path, right: &Path) -> Result<bool, MirrorError> {
    let mut left_file = File::open(left).map_err(|e| MirrorError::io(left, e))?;
    let mut right_file = File::open(right).map_err(|e| MirrorError::io(right, e))?;

    let left_len = left_file
        .metadata()
        .map_err(|e| MirrorError::io(left, e))?
        .len();
    let right_len = right_file
        .metadata()
        .map_err(|e| MirrorError::io(right, e))?
        .len();
    if left_len != right_len {
        return Ok(false);
    }

    let mut left_buf = vec![0u8; COMPARE_CHUNK_SIZE];
    let mut right_buf = vec![0u8; COMPARE_CHUNK_SIZE];

    loop {
        let left_read = fill(&mut left_file, &mut left_buf).map_err(|e| MirrorError::io(left, e))?;
        let right_read =
            fill(&mut right_file, &mut right_buf).map_err(|e| MirrorError::io(right, e))?;

        if left_read != right_read || left_buf[..left_read] != right_buf[..right_read] {
            return Ok(false);
        }
        if left_read == 0 {
            return Ok(true);
        }
    }
}

/// Read until the buffer is full or the reader is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pair(left: &[u8], right: &[u8]) -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let l = temp.path().join("left");
        let r = temp.path().join("right");
        fs::write(&l, left).unwrap();
        fs::write(&r, right).unwrap();
        (temp, l, r)
    }

    #[test]
    fn test_identical_files() {
        let (_temp, l, r) = pair(b"same content", b"same content");
        assert!(files_equal(&l, &r).unwrap());
    }

    #[test]
    fn test_empty_files() {
        let (_temp, l, r) = pair(b"", b"");
        assert!(files_equal(&l, &r).unwrap());
    }

    #[test]
    fn test_different_sizes() {
        let (_temp, l, r) = pair(b"modified", b"test");
        assert!(!files_equal(&l, &r).unwrap());
    }

    #[test]
    fn test_same_size_different_bytes() {
        let (_temp, l, r) = pair(b"abcd", b"abce");
        assert!(!files_equal(&l, &r).unwrap());
    }

    #[test]
    fn test_difference_past_first_chunk() {
        let left = vec![7u8; COMPARE_CHUNK_SIZE * 2 + 10];
        let mut right = left.clone();
        right[COMPARE_CHUNK_SIZE + 5] = 8;

        let (_temp, l, r) = pair(&left, &right);
        assert!(!files_equal(&l, &r).unwrap());

        let (_temp, l, r) = pair(&left, &left);
        assert!(files_equal(&l, &r).unwrap());
    }

    #[test]
    fn test_missing_file() {
        let (temp, l, _r) = pair(b"x", b"x");
        let result = files_equal(&l, &temp.path().join("nope"));
        assert!(matches!(result, Err(MirrorError::NotFound { .. })));
    }
}
