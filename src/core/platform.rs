/*!
 * Platform Constants
 *
 * One immutable table per target, chosen at build time.
 * Values are taken from libc so they always match the target ABI.
 */

use nix::libc;
use std::os::raw::c_int;

#[cfg(target_os = "linux")]
use std::os::raw::{c_long, c_uint};

/// Flag bits used for descriptor control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFlags {
    /// FD_CLOEXEC, toggled through F_GETFD/F_SETFD
    pub fd_cloexec: c_int,
    /// O_NONBLOCK, toggled through F_GETFL/F_SETFL
    pub o_nonblock: c_int,
}

/// Creation flags and syscall numbers for the Linux primitives
#[cfg(target_os = "linux")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinuxFlags {
    pub efd_semaphore: c_int,
    pub efd_nonblock: c_int,
    pub efd_cloexec: c_int,

    pub tfd_nonblock: c_int,
    pub tfd_cloexec: c_int,
    pub tfd_timer_abstime: c_int,

    pub sfd_nonblock: c_int,
    pub sfd_cloexec: c_int,

    pub mfd_cloexec: c_uint,
    pub mfd_allow_sealing: c_uint,
    pub mfd_hugetlb: c_uint,

    pub pidfd_nonblock: c_uint,

    pub sys_signalfd4: c_long,
    pub sys_pidfd_open: c_long,
    pub sys_pidfd_send_signal: c_long,
    pub sys_pidfd_getfd: c_long,
}

/// Per-target constant table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub name: &'static str,
    pub control: ControlFlags,
    #[cfg(target_os = "linux")]
    pub linux: LinuxFlags,
}

const UNIX_CONTROL: ControlFlags = ControlFlags {
    fd_cloexec: libc::FD_CLOEXEC,
    o_nonblock: libc::O_NONBLOCK,
};

#[cfg(target_os = "linux")]
const PLATFORM: Platform = Platform {
    name: "linux",
    control: UNIX_CONTROL,
    linux: LinuxFlags {
        efd_semaphore: libc::EFD_SEMAPHORE,
        efd_nonblock: libc::EFD_NONBLOCK,
        efd_cloexec: libc::EFD_CLOEXEC,
        tfd_nonblock: libc::TFD_NONBLOCK,
        tfd_cloexec: libc::TFD_CLOEXEC,
        tfd_timer_abstime: libc::TFD_TIMER_ABSTIME,
        sfd_nonblock: libc::SFD_NONBLOCK,
        sfd_cloexec: libc::SFD_CLOEXEC,
        mfd_cloexec: libc::MFD_CLOEXEC,
        mfd_allow_sealing: libc::MFD_ALLOW_SEALING,
        mfd_hugetlb: libc::MFD_HUGETLB,
        // PIDFD_NONBLOCK is defined as O_NONBLOCK by the kernel
        pidfd_nonblock: libc::O_NONBLOCK as c_uint,
        sys_signalfd4: libc::SYS_signalfd4,
        sys_pidfd_open: libc::SYS_pidfd_open,
        sys_pidfd_send_signal: libc::SYS_pidfd_send_signal,
        sys_pidfd_getfd: libc::SYS_pidfd_getfd,
    },
};

#[cfg(any(target_os = "macos", target_os = "ios"))]
const PLATFORM: Platform = Platform {
    name: "darwin",
    control: UNIX_CONTROL,
};

#[cfg(target_os = "freebsd")]
const PLATFORM: Platform = Platform {
    name: "freebsd",
    control: UNIX_CONTROL,
};

impl Platform {
    /// Table for the target this crate was built for
    #[inline]
    pub const fn current() -> &'static Platform {
        &PLATFORM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_flags_distinct() {
        let control = Platform::current().control;
        assert_ne!(control.o_nonblock, 0);
        assert_ne!(control.fd_cloexec, 0);
        assert_eq!(control.fd_cloexec & control.o_nonblock, 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_creation_flags() {
        let linux = Platform::current().linux;
        assert_eq!(Platform::current().name, "linux");
        // Non-blocking creation flags all alias O_NONBLOCK on Linux
        let nonblock = Platform::current().control.o_nonblock;
        assert_eq!(linux.efd_nonblock, nonblock);
        assert_eq!(linux.tfd_nonblock, nonblock);
        assert_eq!(linux.sfd_nonblock, nonblock);
        assert_eq!(linux.pidfd_nonblock, nonblock as c_uint);
        assert_eq!(linux.efd_semaphore, 1);
        assert_eq!(linux.tfd_timer_abstime, 1);
        assert_ne!(linux.mfd_allow_sealing, linux.mfd_cloexec);
    }
}
