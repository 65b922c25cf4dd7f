/*!
 * Timer Types
 * Clock selection and the kernel timer specification record
 */

use nix::libc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Clock a timer is measured against, fixed at creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clock {
    /// Never jumps; does not advance while suspended
    #[default]
    Monotonic,
    /// Wall-clock time; follows system time changes
    Realtime,
    /// Like `Monotonic`, but includes time spent suspended
    Boottime,
}

impl Clock {
    #[inline]
    pub fn id(self) -> libc::clockid_t {
        match self {
            Clock::Monotonic => libc::CLOCK_MONOTONIC,
            Clock::Realtime => libc::CLOCK_REALTIME,
            Clock::Boottime => libc::CLOCK_BOOTTIME,
        }
    }
}

/// Timer arming state in nanoseconds
///
/// `value_ns` is the initial delay (or absolute deadline), `interval_ns`
/// the period; zero interval means one-shot, zero value disarms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSpec {
    pub value_ns: u64,
    pub interval_ns: u64,
}

impl TimerSpec {
    pub const DISARMED: TimerSpec = TimerSpec {
        value_ns: 0,
        interval_ns: 0,
    };

    #[inline]
    pub fn new(value_ns: u64, interval_ns: u64) -> Self {
        Self {
            value_ns,
            interval_ns,
        }
    }

    pub fn from_durations(value: Duration, interval: Duration) -> Self {
        Self::new(saturating_nanos(value), saturating_nanos(interval))
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.value_ns != 0
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.is_armed() && self.interval_ns != 0
    }

    /// Kernel layout: interval pair first, then value pair
    pub fn to_kernel(self) -> libc::itimerspec {
        libc::itimerspec {
            it_interval: to_timespec(self.interval_ns),
            it_value: to_timespec(self.value_ns),
        }
    }

    pub fn from_kernel(spec: &libc::itimerspec) -> Self {
        Self {
            value_ns: from_timespec(&spec.it_value),
            interval_ns: from_timespec(&spec.it_interval),
        }
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[inline]
pub(crate) fn to_timespec(ns: u64) -> libc::timespec {
    libc::timespec {
        tv_sec: (ns / NANOS_PER_SEC) as libc::time_t,
        tv_nsec: (ns % NANOS_PER_SEC) as libc::c_long,
    }
}

#[inline]
pub(crate) fn from_timespec(ts: &libc::timespec) -> u64 {
    let secs = u64::try_from(ts.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(ts.tv_nsec).unwrap_or(0);
    secs.saturating_mul(NANOS_PER_SEC).saturating_add(nanos)
}
