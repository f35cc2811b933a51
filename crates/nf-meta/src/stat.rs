//! File status relative to an open directory.

use crate::{check_error, with_cstr, OsError};
use core::mem::MaybeUninit;
use nf_util_time::Timestamp;
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};
use std::path::Path;

/// Selects one of the three timestamps of a [`FileStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TimestampKind {
    Access = 0,
    Change = 1,
    Modification = 2,
}

impl TimestampKind {
    /// Decode the integer selector used by foreign callers.
    ///
    /// # Panics
    ///
    /// On anything but 0, 1 or 2.  Such a value is a bug in the caller.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Access,
            1 => Self::Change,
            2 => Self::Modification,
            _ => panic!("unrecognized timestamp kind {raw}"),
        }
    }
}

/// Generic file-types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    SymLink,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    Unknown,
}

/// A snapshot of the metadata of a filesystem entry.
///
/// Nothing is refreshed; query again to observe changes.
#[derive(Clone, Copy)]
pub struct FileStatus(libc::stat);

impl FileStatus {
    /// The platform structure as returned by `fstatat`.
    pub fn raw(&self) -> &libc::stat {
        &self.0
    }

    pub fn into_raw(self) -> libc::stat {
        self.0
    }

    pub fn size(&self) -> u64 {
        self.0.st_size as u64
    }

    pub fn mode(&self) -> u32 {
        self.0.st_mode as u32
    }

    /// The permission bits including setuid, setgid and sticky.
    pub fn permissions(&self) -> u32 {
        self.mode() & 0o7777
    }

    pub fn file_type(&self) -> FileType {
        match self.0.st_mode & libc::S_IFMT {
            libc::S_IFREG => FileType::File,
            libc::S_IFDIR => FileType::Directory,
            libc::S_IFLNK => FileType::SymLink,
            libc::S_IFCHR => FileType::CharDevice,
            libc::S_IFBLK => FileType::BlockDevice,
            libc::S_IFIFO => FileType::Fifo,
            libc::S_IFSOCK => FileType::Socket,
            _ => FileType::Unknown,
        }
    }

    pub fn dev(&self) -> u64 {
        self.0.st_dev as u64
    }

    pub fn ino(&self) -> u64 {
        self.0.st_ino as u64
    }

    pub fn nlink(&self) -> u64 {
        self.0.st_nlink as u64
    }

    pub fn uid(&self) -> u32 {
        self.0.st_uid
    }

    pub fn gid(&self) -> u32 {
        self.0.st_gid
    }

    pub fn rdev(&self) -> u64 {
        self.0.st_rdev as u64
    }

    pub fn blksize(&self) -> i64 {
        self.0.st_blksize as i64
    }

    pub fn blocks(&self) -> i64 {
        self.0.st_blocks as i64
    }

    /// Whole seconds since the epoch of the selected timestamp.
    pub fn seconds(&self, kind: TimestampKind) -> i64 {
        match kind {
            TimestampKind::Access => self.0.st_atime as i64,
            TimestampKind::Change => self.0.st_ctime as i64,
            TimestampKind::Modification => self.0.st_mtime as i64,
        }
    }

    /// The sub-second remainder in nanoseconds of the selected timestamp.
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_vendor = "apple",
        target_os = "freebsd"
    ))]
    pub fn nanoseconds(&self, kind: TimestampKind) -> i64 {
        match kind {
            TimestampKind::Access => self.0.st_atime_nsec as i64,
            TimestampKind::Change => self.0.st_ctime_nsec as i64,
            TimestampKind::Modification => self.0.st_mtime_nsec as i64,
        }
    }

    /// Without nanosecond fields the timestamps are whole seconds.
    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_vendor = "apple",
        target_os = "freebsd"
    )))]
    pub fn nanoseconds(&self, _kind: TimestampKind) -> i64 {
        0
    }

    /// Both parts of the selected timestamp.
    pub fn timestamp(&self, kind: TimestampKind) -> Timestamp {
        Timestamp::normalized(self.seconds(kind), self.nanoseconds(kind))
    }

    pub fn accessed(&self) -> Timestamp {
        self.timestamp(TimestampKind::Access)
    }

    pub fn changed(&self) -> Timestamp {
        self.timestamp(TimestampKind::Change)
    }

    pub fn modified(&self) -> Timestamp {
        self.timestamp(TimestampKind::Modification)
    }
}

impl core::fmt::Debug for FileStatus {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("FileStatus")
            .field("file_type", &self.file_type())
            .field("mode", &format_args!("{:o}", self.mode()))
            .field("size", &self.size())
            .field("dev", &self.dev())
            .field("ino", &self.ino())
            .field("atime", &self.accessed())
            .field("ctime", &self.changed())
            .field("mtime", &self.modified())
            .finish()
    }
}

/// Whole seconds of the selected timestamp.
pub fn seconds(status: &FileStatus, kind: TimestampKind) -> i64 {
    status.seconds(kind)
}

/// Sub-second nanoseconds of the selected timestamp, in `0..1_000_000_000`.
pub fn nanoseconds(status: &FileStatus, kind: TimestampKind) -> i64 {
    status.nanoseconds(kind)
}

/// Query the status of `name` relative to the open directory `dir`.
///
/// Resolving against a directory handle instead of a full path keeps the
/// lookup on the directory the caller opened, even if it is renamed or
/// replaced in the meantime.  With `follow_symlinks` unset a trailing
/// symlink is reported as itself.  Absolute names ignore `dir`.
pub fn stat_at(dir: BorrowedFd<'_>, name: impl AsRef<Path>, follow_symlinks: bool) -> Result<FileStatus, OsError> {
    fstatat(dir.as_raw_fd(), name.as_ref(), follow_symlinks)
}

/// Like [`stat_at`] but relative to the current working directory.
pub fn stat_at_cwd(name: impl AsRef<Path>, follow_symlinks: bool) -> Result<FileStatus, OsError> {
    fstatat(libc::AT_FDCWD, name.as_ref(), follow_symlinks)
}

fn fstatat(dirfd: RawFd, name: &Path, follow_symlinks: bool) -> Result<FileStatus, OsError> {
    let flags = if follow_symlinks { 0 } else { libc::AT_SYMLINK_NOFOLLOW };
    let mut st = MaybeUninit::<libc::stat>::uninit();
    with_cstr(name.as_os_str(), "fstatat", |cname| {
        check_error(unsafe { libc::fstatat(dirfd, cname.as_ptr(), st.as_mut_ptr(), flags) } as isize, "fstatat")
    })
    .inspect_err(|e| log::trace!("fstatat({dirfd}, {}) failed: {e}", name.display()))?;
    Ok(FileStatus(unsafe { st.assume_init() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::fs::File;
    use std::os::fd::AsFd;
    use std::os::unix::fs::MetadataExt;

    #[test]
    fn stat_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let handle = File::open(dir.path()).unwrap();

        let st = stat_at(handle.as_fd(), "a.txt", true).unwrap();
        let meta = std::fs::metadata(dir.path().join("a.txt")).unwrap();
        assert_eq!(FileType::File, st.file_type());
        assert_eq!(5, st.size());
        assert_eq!(meta.ino(), st.ino());
        assert_eq!(meta.dev(), st.dev());
        assert_eq!(meta.mode(), st.mode());
        assert_eq!(meta.mtime(), seconds(&st, TimestampKind::Modification));
        assert_eq!(meta.mtime_nsec(), nanoseconds(&st, TimestampKind::Modification));
        assert_eq!(meta.ctime(), seconds(&st, TimestampKind::Change));
        assert_eq!(meta.ctime_nsec(), nanoseconds(&st, TimestampKind::Change));
    }

    #[test]
    fn stat_directory_itself() {
        let dir = tempfile::tempdir().unwrap();
        let handle = File::open(dir.path()).unwrap();
        let st = stat_at(handle.as_fd(), ".", false).unwrap();
        assert_eq!(FileType::Directory, st.file_type());
    }

    #[test]
    fn stat_missing() {
        let dir = tempfile::tempdir().unwrap();
        let handle = File::open(dir.path()).unwrap();
        let err = stat_at(handle.as_fd(), "missing", true).unwrap_err();
        assert_eq!(libc::ENOENT, err.code());
        assert_eq!(ErrorKind::NotFound, err.kind());
        assert_eq!("fstatat", err.op());
    }

    #[test]
    fn stat_through_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain"), b"").unwrap();
        let handle = File::open(dir.path()).unwrap();
        let err = stat_at(handle.as_fd(), "plain/child", true).unwrap_err();
        assert_eq!(ErrorKind::NotADirectory, err.kind());
    }

    #[test]
    fn stat_symlink_policy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("target"), b"12345678").unwrap();
        std::os::unix::fs::symlink("target", dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink("nowhere", dir.path().join("dangling")).unwrap();
        let handle = File::open(dir.path()).unwrap();

        let followed = stat_at(handle.as_fd(), "link", true).unwrap();
        assert_eq!(FileType::File, followed.file_type());
        assert_eq!(8, followed.size());

        let itself = stat_at(handle.as_fd(), "link", false).unwrap();
        assert_eq!(FileType::SymLink, itself.file_type());
        assert_eq!(6, itself.size());

        assert!(stat_at(handle.as_fd(), "dangling", true).unwrap_err().is_not_found());
        assert_eq!(FileType::SymLink, stat_at(handle.as_fd(), "dangling", false).unwrap().file_type());
    }

    #[test]
    fn stat_survives_directory_rename() {
        let root = tempfile::tempdir().unwrap();
        let before = root.path().join("before");
        std::fs::create_dir(&before).unwrap();
        std::fs::write(before.join("f"), b"x").unwrap();
        let handle = File::open(&before).unwrap();

        std::fs::rename(&before, root.path().join("after")).unwrap();
        std::fs::create_dir(&before).unwrap();

        assert_eq!(1, stat_at(handle.as_fd(), "f", true).unwrap().size());
        assert!(std::fs::metadata(before.join("f")).is_err());
    }

    #[test]
    fn stat_name_with_nul() {
        let dir = tempfile::tempdir().unwrap();
        let handle = File::open(dir.path()).unwrap();
        let err = stat_at(handle.as_fd(), "a\0b", true).unwrap_err();
        assert_eq!(libc::EINVAL, err.code());
    }

    #[test]
    fn stat_cwd() {
        let st = stat_at_cwd(".", true).unwrap();
        assert_eq!(FileType::Directory, st.file_type());
    }

    #[test]
    fn timestamps_in_range() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("t"), b"").unwrap();
        let handle = File::open(dir.path()).unwrap();
        let st = stat_at(handle.as_fd(), "t", true).unwrap();
        for kind in [TimestampKind::Access, TimestampKind::Change, TimestampKind::Modification] {
            assert!((0..1_000_000_000).contains(&st.nanoseconds(kind)), "{kind:?}");
            let ts = st.timestamp(kind);
            assert_eq!(st.seconds(kind), ts.secs());
            assert_eq!(st.nanoseconds(kind), ts.nanos() as i64);
        }
        assert_eq!(st.modified(), st.timestamp(TimestampKind::Modification));
    }

    #[test]
    fn kind_from_raw() {
        assert_eq!(TimestampKind::Access, TimestampKind::from_raw(0));
        assert_eq!(TimestampKind::Change, TimestampKind::from_raw(1));
        assert_eq!(TimestampKind::Modification, TimestampKind::from_raw(2));
        assert_eq!(2, TimestampKind::Modification as i32);
    }

    #[test]
    #[should_panic(expected = "unrecognized timestamp kind")]
    fn kind_from_raw_rejects_garbage() {
        TimestampKind::from_raw(3);
    }
}
