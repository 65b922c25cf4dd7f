/*!
 * Error Types
 * Semantic error taxonomy for descriptor operations, with thiserror, miette and serde support
 */

use super::sys::RawErrno;
use miette::Diagnostic;
use nix::errno::Errno;
use nix::libc;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io;
use thiserror::Error;

/// Result type for descriptor and handle operations
pub type FdResult<T> = Result<T, FdError>;

/// Semantic descriptor errors, translated from raw kernel error codes
///
/// `WouldBlock` is an expected outcome for empty or not-yet-ready
/// resources, not a failure of the handle.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum FdError {
    /// The descriptor was closed before the call; no kernel call was made
    #[error("file descriptor closed")]
    #[diagnostic(
        code(fd::closed),
        help("The handle was closed before this operation. Create a new handle.")
    )]
    Closed,

    /// Rejected argument, or a fixed-size record transferred short
    #[error("invalid parameter")]
    #[diagnostic(
        code(fd::invalid_parameter),
        help("An argument was rejected, or the kernel returned a short fixed-size record.")
    )]
    InvalidParameter,

    /// EINTR; never retried internally
    #[error("interrupted")]
    #[diagnostic(
        code(fd::interrupted),
        help("A signal interrupted the call. Operations are never retried internally.")
    )]
    Interrupted,

    /// ENOMEM
    #[error("out of memory")]
    #[diagnostic(code(fd::out_of_memory))]
    OutOfMemory,

    /// EACCES or EPERM, including seal violations
    #[error("permission denied")]
    #[diagnostic(
        code(fd::permission_denied),
        help("The caller lacks the privilege, or a seal forbids the operation.")
    )]
    PermissionDenied,

    /// Resource not ready (EAGAIN)
    #[error("operation would block")]
    #[diagnostic(code(fd::would_block), help("The resource is not ready yet. Poll and try again."))]
    WouldBlock,

    /// Operation with no kernel-level implementation
    #[error("operation not supported: {0}")]
    #[diagnostic(code(fd::unsupported))]
    Unsupported(Cow<'static, str>),

    /// Any other kernel error, carrying the original errno
    #[error("unmapped kernel error: {}", describe_errno(.0))]
    #[diagnostic(code(fd::unmapped))]
    Unmapped(i32),
}

/// Human-readable errno, keeping the number even when it has no name
pub(crate) fn describe_errno(code: &i32) -> String {
    match Errno::from_raw(*code) {
        Errno::UnknownErrno => format!("errno {}", code),
        known => format!("{} (errno {})", known, code),
    }
}

impl FdError {
    /// Translate a raw kernel error code; zero means success and yields `None`
    ///
    /// Codes outside the fixed table come back verbatim as `Unmapped`.
    #[inline]
    pub fn from_errno(code: i32) -> Option<Self> {
        if code == 0 {
            return None;
        }
        Some(Self::translate(code))
    }

    fn translate(code: i32) -> Self {
        // EWOULDBLOCK aliases EAGAIN on every supported target
        match code {
            libc::EAGAIN => Self::WouldBlock,
            libc::EBADF => Self::Closed,
            libc::EINVAL => Self::InvalidParameter,
            libc::EINTR => Self::Interrupted,
            libc::ENOMEM => Self::OutOfMemory,
            libc::EACCES | libc::EPERM => Self::PermissionDenied,
            other => Self::Unmapped(other),
        }
    }

    /// Representative raw errno for this error
    pub fn errno(&self) -> i32 {
        match self {
            Self::Closed => libc::EBADF,
            Self::InvalidParameter => libc::EINVAL,
            Self::Interrupted => libc::EINTR,
            Self::OutOfMemory => libc::ENOMEM,
            Self::PermissionDenied => libc::EPERM,
            Self::WouldBlock => libc::EAGAIN,
            Self::Unsupported(_) => libc::EOPNOTSUPP,
            Self::Unmapped(code) => *code,
        }
    }

    #[inline]
    pub fn is_would_block(&self) -> bool {
        matches!(self, Self::WouldBlock)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Create an unsupported-operation error
    #[inline]
    pub fn unsupported(operation: impl Into<Cow<'static, str>>) -> Self {
        Self::Unsupported(operation.into())
    }
}

/// Table mapping for codes nix can name
///
/// `Errno::UnknownErrno` has no code of its own; prefer
/// [`FdError::from_errno`] when the raw number is at hand.
impl From<Errno> for FdError {
    fn from(errno: Errno) -> Self {
        Self::translate(errno as i32)
    }
}

impl From<RawErrno> for FdError {
    fn from(errno: RawErrno) -> Self {
        Self::translate(errno.0)
    }
}

impl From<FdError> for io::Error {
    fn from(err: FdError) -> Self {
        let kind = match &err {
            FdError::WouldBlock => io::ErrorKind::WouldBlock,
            FdError::Interrupted => io::ErrorKind::Interrupted,
            FdError::PermissionDenied => io::ErrorKind::PermissionDenied,
            FdError::InvalidParameter => io::ErrorKind::InvalidInput,
            FdError::OutOfMemory => io::ErrorKind::OutOfMemory,
            FdError::Unsupported(_) => io::ErrorKind::Unsupported,
            FdError::Closed | FdError::Unmapped(_) => {
                return io::Error::from_raw_os_error(err.errno())
            }
        };
        io::Error::new(kind, err)
    }
}

/// Check that a fixed-size record moved in one piece
///
/// A short transfer without an error breaks the record protocol and is
/// reported as `InvalidParameter`.
#[inline]
pub(crate) fn expect_record(transferred: usize, record_size: usize) -> FdResult<usize> {
    if transferred != record_size {
        return Err(FdError::InvalidParameter);
    }
    Ok(transferred)
}
