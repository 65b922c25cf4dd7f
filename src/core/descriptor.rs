/*!
 * Descriptor
 *
 * Owning wrapper around a raw kernel handle number. The slot is atomic:
 * readers load it lock-free and `close` swaps in the closed sentinel, so
 * exactly one caller ever releases the kernel object.
 */

use super::errors::{expect_record, FdError, FdResult};
use super::platform::Platform;
use super::sys::{self, SysResult};
use super::traits::{Closeable, Handle, Pollable};
use log::{error, trace, warn};
use std::fmt;
use std::os::raw::c_int;
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicI32, Ordering};

/// Owned kernel descriptor
///
/// # Invariants
/// - An open descriptor holds a non-negative value
/// - After the first `close`, the slot holds `-1` forever
/// - `close` is idempotent and race-safe across threads
pub struct Descriptor {
    raw: AtomicI32,
}

impl Descriptor {
    /// Closed sentinel
    pub const INVALID: RawFd = -1;

    /// Take ownership of an already-open raw descriptor
    ///
    /// Any negative value is stored as the closed sentinel.
    ///
    /// # Safety
    /// `raw` must be open and owned by nobody else; it will be closed by this value.
    #[inline]
    pub unsafe fn from_raw(raw: RawFd) -> Self {
        Self {
            raw: AtomicI32::new(if raw < 0 { Self::INVALID } else { raw }),
        }
    }

    /// Wrap a descriptor returned by a creation call in this crate
    #[inline]
    pub(crate) fn adopt(raw: RawFd) -> Self {
        debug_assert!(raw >= 0);
        Self {
            raw: AtomicI32::new(raw),
        }
    }

    /// Current handle number, or `-1` once closed
    #[inline]
    pub fn raw(&self) -> RawFd {
        self.raw.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.raw() >= 0
    }

    /// Current handle number, failing with `Closed` without touching the kernel
    #[inline]
    pub(crate) fn live(&self) -> FdResult<RawFd> {
        let raw = self.raw();
        if raw < 0 {
            return Err(FdError::Closed);
        }
        Ok(raw)
    }

    /// Release the descriptor
    ///
    /// Safe to call any number of times from any number of threads; only
    /// the caller that observes the open value performs the release.
    pub fn close(&self) -> FdResult<()> {
        let old = self.raw.swap(Self::INVALID, Ordering::AcqRel);
        if old < 0 {
            return Ok(());
        }
        trace!("closing fd {}", old);
        sys::close(old).map_err(|errno| {
            warn!("close of fd {} failed: {}", old, errno);
            FdError::from(errno)
        })
    }

    /// Read up to `buf.len()` bytes
    pub fn read(&self, buf: &mut [u8]) -> FdResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let raw = self.live()?;
        Ok(sys::read(raw, buf)?)
    }

    /// Write up to `buf.len()` bytes
    pub fn write(&self, buf: &[u8]) -> FdResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let raw = self.live()?;
        Ok(sys::write(raw, buf)?)
    }

    /// Set or clear O_NONBLOCK
    pub fn set_nonblocking(&self, nonblocking: bool) -> FdResult<()> {
        let bit = Platform::current().control.o_nonblock;
        self.update_flag(sys::status_flags, sys::set_status_flags, bit, nonblocking)
    }

    /// Set or clear FD_CLOEXEC
    pub fn set_close_on_exec(&self, close_on_exec: bool) -> FdResult<()> {
        let bit = Platform::current().control.fd_cloexec;
        self.update_flag(sys::fd_flags, sys::set_fd_flags, bit, close_on_exec)
    }

    pub fn nonblocking(&self) -> FdResult<bool> {
        let flags = sys::status_flags(self.live()?)?;
        Ok(flags & Platform::current().control.o_nonblock != 0)
    }

    pub fn close_on_exec(&self) -> FdResult<bool> {
        let flags = sys::fd_flags(self.live()?)?;
        Ok(flags & Platform::current().control.fd_cloexec != 0)
    }

    fn update_flag(
        &self,
        get: fn(RawFd) -> SysResult<c_int>,
        set: fn(RawFd, c_int) -> SysResult<()>,
        bit: c_int,
        enable: bool,
    ) -> FdResult<()> {
        let raw = self.live()?;
        let flags = get(raw)?;
        let updated = if enable { flags | bit } else { flags & !bit };
        if updated != flags {
            set(raw, updated)?;
        }
        Ok(())
    }

    /// Read exactly one fixed-size record
    ///
    /// A short read is `InvalidParameter`; nothing is buffered across calls.
    pub(crate) fn read_record<const N: usize>(&self) -> FdResult<[u8; N]> {
        let raw = self.live()?;
        let mut record = [0u8; N];
        expect_record(sys::read(raw, &mut record)?, N)?;
        Ok(record)
    }

    /// Write exactly one fixed-size record
    pub(crate) fn write_record(&self, record: &[u8]) -> FdResult<usize> {
        let raw = self.live()?;
        expect_record(sys::write(raw, record)?, record.len())
    }

    /// Read one record into the front of a caller buffer of at least `size` bytes
    pub(crate) fn read_record_into(&self, buf: &mut [u8], size: usize) -> FdResult<usize> {
        if buf.len() < size {
            return Err(FdError::InvalidParameter);
        }
        let raw = self.live()?;
        expect_record(sys::read(raw, &mut buf[..size])?, size)
    }

    /// Duplicate into an independent descriptor
    ///
    /// The duplicate is created with FD_CLOEXEC already set (F_DUPFD_CLOEXEC),
    /// so there is no window in which a forked child could inherit it.
    pub fn duplicate(&self) -> FdResult<Descriptor> {
        let raw = self.live()?;
        let dup = sys::dup_cloexec(raw)?;
        trace!("duplicated fd {} as {}", raw, dup);
        Ok(Descriptor::adopt(dup))
    }
}

impl Drop for Descriptor {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Descriptor drop failed to close: {}", e);
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor").field("raw", &self.raw()).finish()
    }
}

impl AsRawFd for Descriptor {
    #[inline]
    fn as_raw_fd(&self) -> RawFd {
        self.raw()
    }
}

impl IntoRawFd for Descriptor {
    /// Give up ownership without closing
    fn into_raw_fd(self) -> RawFd {
        self.raw.swap(Self::INVALID, Ordering::AcqRel)
    }
}

impl FromRawFd for Descriptor {
    unsafe fn from_raw_fd(fd: RawFd) -> Self {
        Self::from_raw(fd)
    }
}

impl From<OwnedFd> for Descriptor {
    fn from(fd: OwnedFd) -> Self {
        Descriptor::adopt(fd.into_raw_fd())
    }
}

impl Pollable for Descriptor {
    #[inline]
    fn fd(&self) -> RawFd {
        self.raw()
    }
}

impl Closeable for Descriptor {
    fn close(&self) -> FdResult<()> {
        Descriptor::close(self)
    }
}

impl Handle for Descriptor {
    fn read(&self, buf: &mut [u8]) -> FdResult<usize> {
        Descriptor::read(self, buf)
    }

    fn write(&self, buf: &[u8]) -> FdResult<usize> {
        Descriptor::write(self, buf)
    }
}
