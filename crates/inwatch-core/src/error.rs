use std::fmt;
use std::io;

use libc::{
    EACCES, EAGAIN, EBADF, EFAULT, EINTR, EINVAL, EIO, EISDIR, EMFILE, ENFILE, ENOENT, ENOMEM,
    ENOSPC, ENOTDIR, EPERM,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Category of a failure, normalized from the originating OS error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    PermissionDenied,
    BadDescriptor,
    InvalidAddress,
    OutOfMemory,
    NoSpace,
    /// Process-wide or system-wide descriptor limit; the description says which.
    TooManyOpenFiles,
    WouldBlock,
    Interrupted,
    IoError,
    IsDirectory,
    NotFound,
    NotADirectory,
    /// The only kind raised by this crate itself, while decoding records.
    MalformedRecord,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::BadDescriptor => "bad descriptor",
            ErrorKind::InvalidAddress => "invalid address",
            ErrorKind::OutOfMemory => "out of memory",
            ErrorKind::NoSpace => "no space",
            ErrorKind::TooManyOpenFiles => "too many open files",
            ErrorKind::WouldBlock => "would block",
            ErrorKind::Interrupted => "interrupted",
            ErrorKind::IoError => "i/o error",
            ErrorKind::IsDirectory => "is a directory",
            ErrorKind::NotFound => "not found",
            ErrorKind::NotADirectory => "not a directory",
            ErrorKind::MalformedRecord => "malformed record",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure from any channel or decoder operation.
///
/// Carries the normalized [`ErrorKind`], the raw OS error number it was mapped
/// from (`None` when the failure was detected without a syscall) and a short
/// description.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {description}")]
pub struct Error {
    kind:        ErrorKind,
    code:        Option<i32>,
    description: String,
}

impl Error {
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            description: description.into(),
        }
    }

    /// Maps a raw OS error number to exactly one kind.
    pub fn from_os_code(code: i32) -> Self {
        let (kind, description) = classify(code);
        Self {
            kind,
            code: Some(code),
            description: description.to_string(),
        }
    }

    pub fn malformed(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRecord, description)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => Error::from_os_code(code),
            None => Error::new(ErrorKind::IoError, err.to_string()),
        }
    }
}

fn classify(code: i32) -> (ErrorKind, &'static str) {
    match code {
        EINVAL => (ErrorKind::InvalidArgument, "EINVAL: invalid argument"),
        EPERM => (ErrorKind::PermissionDenied, "EPERM: operation not permitted"),
        EACCES => (ErrorKind::PermissionDenied, "EACCES: read access to the path is not permitted"),
        EBADF => (ErrorKind::BadDescriptor, "EBADF: descriptor is not a valid notification channel"),
        EFAULT => (ErrorKind::InvalidAddress, "EFAULT: address outside the accessible address space"),
        ENOMEM => (ErrorKind::OutOfMemory, "ENOMEM: insufficient kernel memory"),
        ENOSPC => (ErrorKind::NoSpace, "ENOSPC: user limit on the total number of watches reached"),
        EMFILE => (ErrorKind::TooManyOpenFiles, "EMFILE: per-process limit on open descriptors or instances reached"),
        ENFILE => (ErrorKind::TooManyOpenFiles, "ENFILE: system-wide limit on open files reached"),
        EAGAIN => (ErrorKind::WouldBlock, "EAGAIN: no events queued on a non-blocking channel"),
        EINTR => (ErrorKind::Interrupted, "EINTR: interrupted by a signal"),
        EIO => (ErrorKind::IoError, "EIO: i/o error"),
        EISDIR => (ErrorKind::IsDirectory, "EISDIR: descriptor refers to a directory"),
        ENOENT => (ErrorKind::NotFound, "ENOENT: path does not exist"),
        ENOTDIR => (ErrorKind::NotADirectory, "ENOTDIR: path is not a directory"),
        _ => (ErrorKind::IoError, "unrecognized OS error"),
    }
}
