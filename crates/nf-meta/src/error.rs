//! Platform errors and their messages.

use std::ffi::CStr;

/// The code reported when an extended attribute does not exist.
#[cfg(any(target_vendor = "apple", target_os = "freebsd", target_os = "dragonfly", target_os = "netbsd"))]
pub const ENOATTR: i32 = libc::ENOATTR;
/// The code reported when an extended attribute does not exist.
#[cfg(not(any(target_vendor = "apple", target_os = "freebsd", target_os = "dragonfly", target_os = "netbsd")))]
pub const ENOATTR: i32 = libc::ENODATA;

/// Size of the per-call buffer for `strerror_r`.  Longer messages are cut.
const MESSAGE_MAX: usize = 1024;

/// A failed platform request.
///
/// Keeps the raw `errno` untouched so callers can tell apart codes that
/// [`ErrorKind`] groups together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{op}: {}", describe(.code))]
pub struct OsError {
    code: i32,
    op: &'static str,
}

fn describe(code: &i32) -> String {
    format_error_message(*code)
}

impl OsError {
    pub fn new(code: i32, op: &'static str) -> Self {
        Self { code, op }
    }

    /// Capture `errno` of the calling thread.
    pub fn last(op: &'static str) -> Self {
        let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
        Self { code, op }
    }

    /// The raw platform error code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The name of the primitive that failed.
    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_code(self.code)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_no_attribute(&self) -> bool {
        self.kind() == ErrorKind::NoAttribute
    }

    /// Resource exhaustion or interruption.  Retrying is up to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code,
            libc::EAGAIN | libc::EINTR | libc::ENOMEM | libc::EMFILE | libc::ENFILE
        )
    }

    /// The human readable message without the operation.
    pub fn message(&self) -> String {
        format_error_message(self.code)
    }
}

impl From<OsError> for std::io::Error {
    fn from(err: OsError) -> Self {
        std::io::Error::from_raw_os_error(err.code)
    }
}

/// Coarse classification of platform error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `ENOENT`
    NotFound,
    /// `EACCES`, `EPERM`
    PermissionDenied,
    /// [`ENOATTR`]
    NoAttribute,
    /// `ENOTSUP`, `EOPNOTSUPP`
    Unsupported,
    /// `ENAMETOOLONG`
    NameTooLong,
    /// `EBADF`
    BadHandle,
    /// `ENOTDIR`
    NotADirectory,
    /// `EINVAL`, `ERANGE`
    InvalidInput,
    Other,
}

impl ErrorKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            libc::ENOENT => Self::NotFound,
            libc::EACCES | libc::EPERM => Self::PermissionDenied,
            c if c == ENOATTR => Self::NoAttribute,
            c if c == libc::ENOTSUP || c == libc::EOPNOTSUPP => Self::Unsupported,
            libc::ENAMETOOLONG => Self::NameTooLong,
            libc::EBADF => Self::BadHandle,
            libc::ENOTDIR => Self::NotADirectory,
            libc::EINVAL | libc::ERANGE => Self::InvalidInput,
            _ => Self::Other,
        }
    }
}

/// Render a platform error code as text.
///
/// Never fails and never returns an empty string: codes the platform does not
/// know yield `"Unknown error <code>"`.  The message is formatted into a
/// buffer on the stack of the calling thread.
pub fn format_error_message(code: i32) -> String {
    let mut buf = [0 as libc::c_char; MESSAGE_MAX];
    // the libc crate binds the XSI variant, also on glibc
    let res = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
    buf[MESSAGE_MAX - 1] = 0;
    let msg = unsafe { CStr::from_ptr(buf.as_ptr()) };
    if (res == 0 || res == libc::ERANGE) && !msg.to_bytes().is_empty() {
        return msg.to_string_lossy().into_owned();
    }
    log::trace!("strerror_r({code}) failed with {res}");
    format!("Unknown error {code}")
}
