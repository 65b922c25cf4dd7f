/*!
 * Signal Queue Handle (signalfd)
 *
 * Delivers the process's blocked signals as fixed-size records instead of
 * asynchronous interruption. The caller must block the monitored signals
 * (sigprocmask / pthread_sigmask) before creating the handle; this type
 * does not change the process signal mask.
 */

pub mod types;

pub use types::{SigSet, SignalInfo, MAX_SIGNAL, SIGNAL_INFO_SIZE};

use crate::core::sys;
use crate::core::{Closeable, Descriptor, FdResult, Platform, Pollable};
use log::debug;
use std::os::unix::io::{AsRawFd, RawFd};

/// Signal queue handle with its monitored mask
#[derive(Debug)]
pub struct SignalFd {
    fd: Descriptor,
    mask: SigSet,
}

impl SignalFd {
    /// Monitor `mask`; created non-blocking and close-on-exec
    pub fn new(mask: SigSet) -> FdResult<Self> {
        let linux = Platform::current().linux;
        let flags = linux.sfd_nonblock | linux.sfd_cloexec;
        let raw = sys::signalfd4(Descriptor::INVALID, mask.bits(), flags)?;
        debug!("signalfd created: fd={}, mask={:?}", raw, mask);
        Ok(Self {
            fd: Descriptor::adopt(raw),
            mask,
        })
    }

    /// Currently monitored signals
    #[inline]
    pub fn mask(&self) -> SigSet {
        self.mask
    }

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.fd
    }

    pub fn close(&self) -> FdResult<()> {
        self.fd.close()
    }

    /// Next pending signal matching the mask, or `WouldBlock`
    pub fn read(&self) -> FdResult<SignalInfo> {
        let record = self.fd.read_record::<SIGNAL_INFO_SIZE>()?;
        Ok(SignalInfo::from_bytes(&record))
    }

    /// Raw record into `buf` (at least 128 bytes)
    pub fn read_into(&self, buf: &mut [u8]) -> FdResult<usize> {
        self.fd.read_record_into(buf, SIGNAL_INFO_SIZE)
    }

    /// Replace the monitored mask
    ///
    /// The cached mask changes only after the kernel accepted the new one.
    pub fn set_mask(&mut self, mask: SigSet) -> FdResult<()> {
        let raw = self.fd.live()?;
        // Creation flags are ignored when updating an existing descriptor
        sys::signalfd4(raw, mask.bits(), 0)?;
        self.mask = mask;
        Ok(())
    }
}

impl AsRawFd for SignalFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Pollable for SignalFd {
    fn fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Closeable for SignalFd {
    fn close(&self) -> FdResult<()> {
        self.fd.close()
    }
}
