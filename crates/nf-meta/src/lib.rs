//! Portable filesystem metadata.
//!
//! A thin layer over the platform primitives a build engine needs to decide
//! whether a file changed:
//!
//!   - [`stat_at`] queries the status of a name relative to an open directory.
//!   - [`seconds`] and [`nanoseconds`] pick one of the three timestamps.
//!   - [`get_xattr`] reads an extended attribute into a caller buffer.
//!   - [`format_error_message`] renders an `errno` and never fails.
//!
//! Every call performs a single platform request and keeps no state.  File
//! descriptors are borrowed, never opened or closed here.

use std::ffi::{CStr, OsStr};
use std::os::unix::ffi::OsStrExt;

mod digest;
mod error;
mod stat;
mod xattr;

pub use digest::DigestAttribute;
pub use error::{format_error_message, ErrorKind, OsError, ENOATTR};
pub use nf_util_time::Timestamp;
pub use stat::{nanoseconds, seconds, stat_at, stat_at_cwd, FileStatus, FileType, TimestampKind};
pub use xattr::{get_xattr, getxattr, lgetxattr, read_xattr};

/// Turn the `-1` convention of libc into an error.
fn check_error(res: isize, op: &'static str) -> Result<usize, OsError> {
    if res < 0 {
        return Err(OsError::last(op));
    }
    Ok(res as usize)
}

/// Run `f` with a NUL-terminated copy of `s` that lives on the stack.
///
/// Names that do not fit into `PATH_MAX` fail with `ENAMETOOLONG`, embedded
/// NUL bytes with `EINVAL`.
fn with_cstr<T>(
    s: &OsStr,
    op: &'static str,
    f: impl FnOnce(&CStr) -> Result<T, OsError>,
) -> Result<T, OsError> {
    let bytes = s.as_bytes();
    let mut buf = [0u8; libc::PATH_MAX as usize];
    if bytes.len() >= buf.len() {
        return Err(OsError::new(libc::ENAMETOOLONG, op));
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    let cstr = CStr::from_bytes_with_nul(&buf[..=bytes.len()]).map_err(|_| OsError::new(libc::EINVAL, op))?;
    f(cstr)
}
