/*!
 * Event Counter (eventfd)
 *
 * 64-bit kernel counter: writes add, reads drain. In semaphore mode each
 * read takes exactly one unit. Always created non-blocking.
 */

use crate::core::sys;
use crate::core::{Closeable, Descriptor, FdError, FdResult, Platform, Pollable, Signaler};
use log::debug;
use std::os::unix::io::{AsRawFd, RawFd};

/// Size of the eventfd I/O record
pub const COUNTER_RECORD_SIZE: usize = 8;

/// Largest value the kernel counter can hold (2^64 - 2)
pub const COUNTER_MAX: u64 = u64::MAX - 1;

/// Creation options for [`EventFd`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFdOptions {
    pub semaphore: bool,
    pub close_on_exec: bool,
}

impl EventFdOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_semaphore(mut self, semaphore: bool) -> Self {
        self.semaphore = semaphore;
        self
    }

    pub fn with_close_on_exec(mut self, close_on_exec: bool) -> Self {
        self.close_on_exec = close_on_exec;
        self
    }
}

impl Default for EventFdOptions {
    fn default() -> Self {
        Self {
            semaphore: false,
            close_on_exec: true,
        }
    }
}

/// Event notification counter
#[derive(Debug)]
pub struct EventFd {
    fd: Descriptor,
    semaphore: bool,
}

impl EventFd {
    /// Standard-mode counter starting at `initval`
    pub fn new(initval: u32) -> FdResult<Self> {
        Self::with_options(initval, EventFdOptions::default())
    }

    /// Semaphore-mode counter starting at `initval`
    pub fn semaphore(initval: u32) -> FdResult<Self> {
        Self::with_options(initval, EventFdOptions::default().with_semaphore(true))
    }

    pub fn with_options(initval: u32, options: EventFdOptions) -> FdResult<Self> {
        let linux = Platform::current().linux;
        let mut flags = linux.efd_nonblock;
        if options.close_on_exec {
            flags |= linux.efd_cloexec;
        }
        if options.semaphore {
            flags |= linux.efd_semaphore;
        }
        let raw = sys::eventfd(initval, flags)?;
        debug!("eventfd created: fd={}, initval={}, flags={:#x}", raw, initval, flags);
        Ok(Self {
            fd: Descriptor::adopt(raw),
            semaphore: options.semaphore,
        })
    }

    #[inline]
    pub fn is_semaphore(&self) -> bool {
        self.semaphore
    }

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.fd
    }

    pub fn close(&self) -> FdResult<()> {
        self.fd.close()
    }

    /// Add `delta` to the counter
    ///
    /// `delta == 0` is a no-op. Returns `WouldBlock` if the addition would
    /// push the counter past [`COUNTER_MAX`].
    pub fn signal(&self, delta: u64) -> FdResult<()> {
        if delta == 0 {
            return Ok(());
        }
        self.fd.write_record(&delta.to_ne_bytes())?;
        Ok(())
    }

    /// Drain the counter
    ///
    /// Standard mode returns the accumulated value and resets it to zero;
    /// semaphore mode returns 1 and decrements. `WouldBlock` when empty.
    pub fn wait(&self) -> FdResult<u64> {
        let record = self.fd.read_record::<COUNTER_RECORD_SIZE>()?;
        Ok(u64::from_ne_bytes(record))
    }

    /// Raw record read into `buf` (only the first 8 bytes are used)
    pub fn read_into(&self, buf: &mut [u8]) -> FdResult<usize> {
        self.fd.read_record_into(buf, COUNTER_RECORD_SIZE)
    }

    /// Raw record write from `buf` (native-endian u64 in the first 8 bytes)
    pub fn write_from(&self, buf: &[u8]) -> FdResult<usize> {
        if buf.len() < COUNTER_RECORD_SIZE {
            return Err(FdError::InvalidParameter);
        }
        self.fd.write_record(&buf[..COUNTER_RECORD_SIZE])
    }

    /// Always `Unsupported`: the kernel offers no non-destructive read of the counter
    pub fn peek(&self) -> FdResult<u64> {
        Err(FdError::unsupported("eventfd counter cannot be read without consuming it"))
    }
}

impl AsRawFd for EventFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Pollable for EventFd {
    fn fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Closeable for EventFd {
    fn close(&self) -> FdResult<()> {
        self.fd.close()
    }
}

impl Signaler for EventFd {
    fn signal(&self, delta: u64) -> FdResult<()> {
        EventFd::signal(self, delta)
    }

    fn wait(&self) -> FdResult<u64> {
        EventFd::wait(self)
    }
}
