//! Reading extended attributes.

use crate::{with_cstr, OsError};
use std::ffi::OsStr;
use std::path::Path;

/// How often [`read_xattr`] retries when the attribute grows under it.
const READ_ATTEMPTS: usize = 4;

/// Read the attribute `name` of `path`, following a trailing symlink.
pub fn getxattr(path: impl AsRef<Path>, name: impl AsRef<OsStr>, value: &mut [u8]) -> Result<usize, OsError> {
    get_xattr(path, name, value, true)
}

/// Read the attribute `name` of `path` itself, even if it is a symlink.
pub fn lgetxattr(path: impl AsRef<Path>, name: impl AsRef<OsStr>, value: &mut [u8]) -> Result<usize, OsError> {
    get_xattr(path, name, value, false)
}

/// Read an extended attribute into `value` and return its length.
///
/// The length of `value` is the capacity handed to the platform.  An empty
/// buffer only asks for the size of the attribute.  A buffer too small fails
/// with `ERANGE`, a missing attribute with [`crate::ENOATTR`].
pub fn get_xattr(
    path: impl AsRef<Path>,
    name: impl AsRef<OsStr>,
    value: &mut [u8],
    follow_symlinks: bool,
) -> Result<usize, OsError> {
    let path = path.as_ref();
    let name = name.as_ref();
    let op = if follow_symlinks { "getxattr" } else { "lgetxattr" };
    with_cstr(path.as_os_str(), op, |cpath| {
        with_cstr(name, op, |cname| sys::get(cpath, cname, value, follow_symlinks, op))
    })
    .inspect_err(|e| log::trace!("{op}({}, {}) failed: {e}", path.display(), name.to_string_lossy()))
}

/// Read a whole attribute.  A missing attribute is `None`.
///
/// Asks for the size first and reads into a buffer of exactly that size,
/// starting over when another writer grew the value in between.
pub fn read_xattr(
    path: impl AsRef<Path>,
    name: impl AsRef<OsStr>,
    follow_symlinks: bool,
) -> Result<Option<Vec<u8>>, OsError> {
    let path = path.as_ref();
    let name = name.as_ref();
    for _ in 0..READ_ATTEMPTS {
        let size = match get_xattr(path, name, &mut [], follow_symlinks) {
            Ok(size) => size,
            Err(e) if e.is_no_attribute() => return Ok(None),
            Err(e) => return Err(e),
        };
        let mut value = vec![0u8; size];
        match get_xattr(path, name, &mut value, follow_symlinks) {
            Ok(n) => {
                value.truncate(n);
                return Ok(Some(value));
            }
            Err(e) if e.code() == libc::ERANGE => continue,
            Err(e) if e.is_no_attribute() => return Ok(None),
            Err(e) => return Err(e),
        }
    }
    Err(OsError::new(libc::ERANGE, if follow_symlinks { "getxattr" } else { "lgetxattr" }))
}

/// Pointer and capacity for the platform call.  No pointer for empty buffers.
#[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple"))]
fn raw_value(value: &mut [u8]) -> (*mut libc::c_void, usize) {
    if value.is_empty() {
        return (core::ptr::null_mut(), 0);
    }
    (value.as_mut_ptr() as *mut libc::c_void, value.len())
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod sys {
    use super::*;
    use crate::check_error;
    use std::ffi::CStr;

    pub(super) fn get(path: &CStr, name: &CStr, value: &mut [u8], follow: bool, op: &'static str) -> Result<usize, OsError> {
        let (ptr, len) = raw_value(value);
        let res = unsafe {
            if follow {
                libc::getxattr(path.as_ptr(), name.as_ptr(), ptr, len)
            } else {
                libc::lgetxattr(path.as_ptr(), name.as_ptr(), ptr, len)
            }
        };
        check_error(res, op)
    }
}

#[cfg(target_vendor = "apple")]
mod sys {
    use super::*;
    use crate::check_error;
    use std::ffi::CStr;

    pub(super) fn get(path: &CStr, name: &CStr, value: &mut [u8], follow: bool, op: &'static str) -> Result<usize, OsError> {
        let (ptr, len) = raw_value(value);
        let options = if follow { 0 } else { libc::XATTR_NOFOLLOW };
        let res = unsafe { libc::getxattr(path.as_ptr(), name.as_ptr(), ptr, len, 0, options) };
        check_error(res, op)
    }
}

/// No extended attributes on this platform.
#[cfg(not(any(target_os = "linux", target_os = "android", target_vendor = "apple")))]
mod sys {
    use super::*;
    use std::ffi::CStr;

    pub(super) fn get(_path: &CStr, _name: &CStr, _value: &mut [u8], _follow: bool, op: &'static str) -> Result<usize, OsError> {
        Err(OsError::new(libc::ENOTSUP, op))
    }
}
