//! Content digests cached in extended attributes.

use crate::{get_xattr, ErrorKind, OsError};
use std::path::Path;

/// An extended attribute that may hold the digest of a file's content.
///
/// Some filesystems and tools maintain a checksum of the file data as an
/// attribute.  A build engine can use it instead of hashing the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestAttribute {
    name: String,
    len: usize,
}

impl DigestAttribute {
    /// An attribute `name` carrying a binary digest of `len` bytes.
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self { name: name.into(), len }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The expected digest length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fetch the digest of `path`.
    ///
    /// Returns `None` if the attribute is missing, the filesystem has no
    /// extended attributes, or the value has the wrong length.  Other
    /// failures, like a missing `path`, are errors.
    pub fn read(&self, path: impl AsRef<Path>, follow_symlinks: bool) -> Result<Option<Vec<u8>>, OsError> {
        let mut value = vec![0u8; self.len];
        match get_xattr(path, &self.name, &mut value, follow_symlinks) {
            Ok(n) if n == self.len => Ok(Some(value)),
            Ok(n) => {
                log::debug!("digest attribute {} has {n} bytes, expected {}", self.name, self.len);
                Ok(None)
            }
            Err(e) => match e.kind() {
                ErrorKind::NoAttribute | ErrorKind::Unsupported => Ok(None),
                // longer than expected
                ErrorKind::InvalidInput if e.code() == libc::ERANGE => Ok(None),
                _ => Err(e),
            },
        }
    }
}
