/*!
 * Kernel Calls
 *
 * Shims between the handles and the kernel. Calls nix wraps go through its
 * safe API. The rest are issued directly: timerfd_* because nix's `TimerFd`
 * keeps ownership of its descriptor, signalfd4 and the pidfd family because
 * nix has no wrapper taking a raw 64-bit mask or a pidfd.
 *
 * Failures come back as the raw errno, untranslated.
 */

use super::errors::describe_errno;
use nix::errno::Errno;
use nix::fcntl::{self, FcntlArg, FdFlag, OFlag};
use nix::libc;
use nix::sys::stat;
use nix::unistd;
use std::fmt;
use std::os::raw::c_int;
use std::os::unix::io::{BorrowedFd, RawFd};

#[cfg(target_os = "linux")]
use super::platform::Platform;
#[cfg(target_os = "linux")]
use nix::fcntl::SealFlag;
#[cfg(target_os = "linux")]
use nix::sys::eventfd::{EfdFlags, EventFd};
#[cfg(target_os = "linux")]
use nix::sys::memfd::{self, MemFdCreateFlag};
#[cfg(target_os = "linux")]
use nix::time::{self, ClockId};
#[cfg(target_os = "linux")]
use std::ffi::CStr;
#[cfg(target_os = "linux")]
use std::mem::MaybeUninit;
#[cfg(target_os = "linux")]
use std::os::raw::{c_long, c_uint};
#[cfg(target_os = "linux")]
use std::os::unix::io::{IntoRawFd, OwnedFd};

/// errno of a failed call, kept verbatim even when nix has no name for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawErrno(pub i32);

impl From<Errno> for RawErrno {
    fn from(errno: Errno) -> Self {
        match errno {
            // nix folds codes it does not know into UnknownErrno; errno still holds the value
            Errno::UnknownErrno => Self(Errno::last_raw()),
            known => Self(known as i32),
        }
    }
}

impl fmt::Display for RawErrno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_errno(&self.0))
    }
}

pub type SysResult<T> = Result<T, RawErrno>;

/// Borrow a descriptor number just loaded from a live slot
#[inline]
fn borrowed<'a>(fd: RawFd) -> BorrowedFd<'a> {
    debug_assert!(fd >= 0);
    unsafe { BorrowedFd::borrow_raw(fd) }
}

#[inline]
pub fn read(fd: RawFd, buf: &mut [u8]) -> SysResult<usize> {
    Ok(unistd::read(fd, buf)?)
}

#[inline]
pub fn write(fd: RawFd, buf: &[u8]) -> SysResult<usize> {
    Ok(unistd::write(borrowed(fd), buf)?)
}

#[inline]
pub fn close(fd: RawFd) -> SysResult<()> {
    Ok(unistd::close(fd)?)
}

/// F_GETFD
pub fn fd_flags(fd: RawFd) -> SysResult<c_int> {
    Ok(fcntl::fcntl(fd, FcntlArg::F_GETFD)?)
}

/// F_SETFD
pub fn set_fd_flags(fd: RawFd, bits: c_int) -> SysResult<()> {
    fcntl::fcntl(fd, FcntlArg::F_SETFD(FdFlag::from_bits_retain(bits)))?;
    Ok(())
}

/// F_GETFL
pub fn status_flags(fd: RawFd) -> SysResult<c_int> {
    Ok(fcntl::fcntl(fd, FcntlArg::F_GETFL)?)
}

/// F_SETFL
pub fn set_status_flags(fd: RawFd, bits: c_int) -> SysResult<()> {
    fcntl::fcntl(fd, FcntlArg::F_SETFL(OFlag::from_bits_retain(bits)))?;
    Ok(())
}

/// F_DUPFD_CLOEXEC: the copy never exists without FD_CLOEXEC
pub fn dup_cloexec(fd: RawFd) -> SysResult<RawFd> {
    Ok(fcntl::fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(0))?)
}

pub fn fstat_size(fd: RawFd) -> SysResult<libc::off_t> {
    Ok(stat::fstat(fd)?.st_size)
}

#[inline]
pub fn ftruncate(fd: RawFd, len: libc::off_t) -> SysResult<()> {
    Ok(unistd::ftruncate(borrowed(fd), len)?)
}

#[cfg(target_os = "linux")]
pub fn add_seals(fd: RawFd, bits: c_int) -> SysResult<()> {
    fcntl::fcntl(fd, FcntlArg::F_ADD_SEALS(SealFlag::from_bits_retain(bits)))?;
    Ok(())
}

#[cfg(target_os = "linux")]
pub fn seals(fd: RawFd) -> SysResult<c_int> {
    Ok(fcntl::fcntl(fd, FcntlArg::F_GET_SEALS)?)
}

#[cfg(target_os = "linux")]
pub fn clock_gettime(clock: libc::clockid_t) -> SysResult<libc::timespec> {
    let now = time::clock_gettime(ClockId::from_raw(clock))?;
    Ok(*now.as_ref())
}

#[cfg(target_os = "linux")]
pub fn eventfd(initval: c_uint, flags: c_int) -> SysResult<RawFd> {
    let efd = EventFd::from_value_and_flags(initval, EfdFlags::from_bits_retain(flags))?;
    Ok(OwnedFd::from(efd).into_raw_fd())
}

#[cfg(target_os = "linux")]
pub fn memfd_create(name: &CStr, flags: c_uint) -> SysResult<RawFd> {
    let fd = memfd::memfd_create(name, MemFdCreateFlag::from_bits_retain(flags))?;
    Ok(fd.into_raw_fd())
}

#[cfg(target_os = "linux")]
#[inline]
pub fn timerfd_create(clock: libc::clockid_t, flags: c_int) -> SysResult<RawFd> {
    Ok(Errno::result(unsafe { libc::timerfd_create(clock, flags) })?)
}

#[cfg(target_os = "linux")]
pub fn timerfd_settime(fd: RawFd, flags: c_int, new_value: &libc::itimerspec) -> SysResult<()> {
    Errno::result(unsafe { libc::timerfd_settime(fd, flags, new_value, std::ptr::null_mut()) })?;
    Ok(())
}

#[cfg(target_os = "linux")]
pub fn timerfd_gettime(fd: RawFd) -> SysResult<libc::itimerspec> {
    let mut curr = MaybeUninit::<libc::itimerspec>::uninit();
    Errno::result(unsafe { libc::timerfd_gettime(fd, curr.as_mut_ptr()) })?;
    Ok(unsafe { curr.assume_init() })
}

#[cfg(target_os = "linux")]
pub fn signalfd4(fd: RawFd, mask: u64, flags: c_int) -> SysResult<RawFd> {
    let nr = Platform::current().linux.sys_signalfd4;
    let ret = Errno::result(unsafe {
        libc::syscall(
            nr,
            fd as c_long,
            &mask as *const u64,
            std::mem::size_of::<u64>(),
            flags as c_long,
        )
    })?;
    Ok(ret as RawFd)
}

#[cfg(target_os = "linux")]
pub fn pidfd_open(pid: libc::pid_t, flags: c_uint) -> SysResult<RawFd> {
    let nr = Platform::current().linux.sys_pidfd_open;
    let ret = Errno::result(unsafe { libc::syscall(nr, pid as c_long, flags as c_long) })?;
    Ok(ret as RawFd)
}

#[cfg(target_os = "linux")]
pub fn pidfd_send_signal(pidfd: RawFd, sig: c_int) -> SysResult<()> {
    let nr = Platform::current().linux.sys_pidfd_send_signal;
    Errno::result(unsafe {
        libc::syscall(
            nr,
            pidfd as c_long,
            sig as c_long,
            std::ptr::null::<libc::siginfo_t>(),
            0 as c_long,
        )
    })?;
    Ok(())
}

#[cfg(target_os = "linux")]
pub fn pidfd_getfd(pidfd: RawFd, target_fd: RawFd) -> SysResult<RawFd> {
    let nr = Platform::current().linux.sys_pidfd_getfd;
    let ret = Errno::result(unsafe {
        libc::syscall(nr, pidfd as c_long, target_fd as c_long, 0 as c_long)
    })?;
    Ok(ret as RawFd)
}
