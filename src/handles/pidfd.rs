/*!
 * Process Handle (pidfd)
 *
 * Refers to one process instance, not to its numeric id, so signals sent
 * through it can never reach a later process that reused the PID. The
 * descriptor becomes readable when the process exits.
 */

use crate::core::sys;
use crate::core::{Closeable, Descriptor, FdError, FdResult, Platform, Pollable};
use log::debug;
use nix::libc::pid_t;
use std::os::unix::io::{AsRawFd, RawFd};

#[derive(Debug)]
pub struct PidFd {
    fd: Descriptor,
    pid: pid_t,
}

impl PidFd {
    /// Open a non-blocking handle to `pid`
    pub fn open(pid: pid_t) -> FdResult<Self> {
        Self::open_with_flags(pid, Platform::current().linux.pidfd_nonblock)
    }

    /// Open a handle without PIDFD_NONBLOCK
    pub fn open_blocking(pid: pid_t) -> FdResult<Self> {
        Self::open_with_flags(pid, 0)
    }

    fn open_with_flags(pid: pid_t, flags: u32) -> FdResult<Self> {
        if pid <= 0 {
            return Err(FdError::InvalidParameter);
        }
        let raw = sys::pidfd_open(pid, flags)?;
        debug!("pidfd opened: fd={}, pid={}", raw, pid);
        Ok(Self {
            fd: Descriptor::adopt(raw),
            pid,
        })
    }

    /// PID captured at open time
    ///
    /// The kernel may hand this number to a new process after the original
    /// exits; the handle itself keeps referring to the original.
    #[inline]
    pub fn pid(&self) -> pid_t {
        self.pid
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.fd.is_valid()
    }

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.fd
    }

    pub fn close(&self) -> FdResult<()> {
        self.fd.close()
    }

    /// Send `sig` to the exact process instance this handle refers to
    ///
    /// Signal 0 performs the permission and liveness check only.
    pub fn send_signal(&self, sig: i32) -> FdResult<()> {
        let raw = self.fd.live()?;
        sys::pidfd_send_signal(raw, sig)?;
        Ok(())
    }

    /// Duplicate descriptor `target_fd` of the target process into this one
    ///
    /// Needs ptrace-attach rights over the target (CAP_SYS_PTRACE or the
    /// same credentials). The new descriptor has close-on-exec set.
    pub fn duplicate_foreign(&self, target_fd: RawFd) -> FdResult<Descriptor> {
        let raw = self.fd.live()?;
        let local = sys::pidfd_getfd(raw, target_fd)?;
        debug!(
            "pidfd_getfd: pid={}, remote fd={} -> local fd={}",
            self.pid, target_fd, local
        );
        Ok(Descriptor::adopt(local))
    }
}

impl AsRawFd for PidFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Pollable for PidFd {
    fn fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Closeable for PidFd {
    fn close(&self) -> FdResult<()> {
        self.fd.close()
    }
}
