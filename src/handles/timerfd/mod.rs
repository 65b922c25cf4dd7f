/*!
 * Timer Handle (timerfd)
 *
 * Relative or absolute, one-shot or periodic timers whose expirations are
 * counted by the kernel and drained with `read`. Created disarmed and
 * non-blocking.
 */

pub mod types;

pub use types::{Clock, TimerSpec, NANOS_PER_SEC};

use crate::core::sys;
use crate::core::{Closeable, Descriptor, FdResult, Platform, Pollable, Timer};
use log::debug;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

/// Size of the timerfd expiration record
pub const TIMER_RECORD_SIZE: usize = 8;

/// Kernel timer handle bound to one clock
#[derive(Debug)]
pub struct TimerFd {
    fd: Descriptor,
    clock: Clock,
}

impl TimerFd {
    /// Monotonic-clock timer
    pub fn new() -> FdResult<Self> {
        Self::with_clock(Clock::Monotonic)
    }

    /// Wall-clock timer
    pub fn realtime() -> FdResult<Self> {
        Self::with_clock(Clock::Realtime)
    }

    /// Monotonic timer that keeps counting through suspend
    pub fn boottime() -> FdResult<Self> {
        Self::with_clock(Clock::Boottime)
    }

    pub fn with_clock(clock: Clock) -> FdResult<Self> {
        let linux = Platform::current().linux;
        let flags = linux.tfd_nonblock | linux.tfd_cloexec;
        let raw = sys::timerfd_create(clock.id(), flags)?;
        debug!("timerfd created: fd={}, clock={:?}", raw, clock);
        Ok(Self {
            fd: Descriptor::adopt(raw),
            clock,
        })
    }

    #[inline]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.fd
    }

    pub fn close(&self) -> FdResult<()> {
        self.fd.close()
    }

    /// Arm relative to now
    ///
    /// `initial_ns == 0` disarms regardless of `interval_ns`;
    /// `interval_ns == 0` makes the timer one-shot.
    pub fn arm(&self, initial_ns: u64, interval_ns: u64) -> FdResult<()> {
        self.settime(0, TimerSpec::new(initial_ns, interval_ns))
    }

    /// Arm at an absolute deadline on this handle's clock
    pub fn arm_at(&self, deadline_ns: u64, interval_ns: u64) -> FdResult<()> {
        let abstime = Platform::current().linux.tfd_timer_abstime;
        self.settime(abstime, TimerSpec::new(deadline_ns, interval_ns))
    }

    pub fn arm_duration(&self, initial: Duration, interval: Duration) -> FdResult<()> {
        self.settime(0, TimerSpec::from_durations(initial, interval))
    }

    pub fn disarm(&self) -> FdResult<()> {
        self.arm(0, 0)
    }

    fn settime(&self, flags: i32, spec: TimerSpec) -> FdResult<()> {
        let raw = self.fd.live()?;
        let spec = if spec.is_armed() {
            spec
        } else {
            TimerSpec::DISARMED
        };
        sys::timerfd_settime(raw, flags, &spec.to_kernel())?;
        Ok(())
    }

    /// Expirations since the last successful read
    ///
    /// Never returns 0: an unexpired or disarmed timer yields `WouldBlock`.
    pub fn read(&self) -> FdResult<u64> {
        let record = self.fd.read_record::<TIMER_RECORD_SIZE>()?;
        Ok(u64::from_ne_bytes(record))
    }

    /// Raw expiration record into `buf` (at least 8 bytes)
    pub fn read_into(&self, buf: &mut [u8]) -> FdResult<usize> {
        self.fd.read_record_into(buf, TIMER_RECORD_SIZE)
    }

    /// `(remaining_ns, interval_ns)`; both zero when disarmed
    pub fn get_time(&self) -> FdResult<(u64, u64)> {
        let raw = self.fd.live()?;
        let curr = TimerSpec::from_kernel(&sys::timerfd_gettime(raw)?);
        Ok((curr.value_ns, curr.interval_ns))
    }

    /// Current time on this handle's clock, for computing `arm_at` deadlines
    ///
    /// Fails with `Closed` once the handle is closed.
    pub fn now_ns(&self) -> FdResult<u64> {
        self.fd.live()?;
        let ts = sys::clock_gettime(self.clock.id())?;
        Ok(types::from_timespec(&ts))
    }
}

impl AsRawFd for TimerFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Pollable for TimerFd {
    fn fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Closeable for TimerFd {
    fn close(&self) -> FdResult<()> {
        self.fd.close()
    }
}

impl Timer for TimerFd {
    fn arm(&self, initial_ns: u64, interval_ns: u64) -> FdResult<()> {
        TimerFd::arm(self, initial_ns, interval_ns)
    }

    fn disarm(&self) -> FdResult<()> {
        TimerFd::disarm(self)
    }

    fn read(&self) -> FdResult<u64> {
        TimerFd::read(self)
    }
}
