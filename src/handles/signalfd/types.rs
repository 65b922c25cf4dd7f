/*!
 * Signal Types
 * Signal sets and the fixed 128-byte signalfd record
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of one signalfd record
pub const SIGNAL_INFO_SIZE: usize = 128;

/// Highest signal number a [`SigSet`] can represent
pub const MAX_SIGNAL: i32 = 64;

/// 64-bit signal membership mask; bit `n - 1` holds signal `n`
///
/// Signal numbers outside `1..=64` are ignored by every operation.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SigSet(u64);

impl SigSet {
    #[inline]
    pub const fn new() -> Self {
        SigSet(0)
    }

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        SigSet(bits)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    fn bit(sig: i32) -> Option<u64> {
        if (1..=MAX_SIGNAL).contains(&sig) {
            Some(1u64 << (sig - 1))
        } else {
            None
        }
    }

    pub fn add(&mut self, sig: i32) {
        if let Some(bit) = Self::bit(sig) {
            self.0 |= bit;
        }
    }

    pub fn remove(&mut self, sig: i32) {
        if let Some(bit) = Self::bit(sig) {
            self.0 &= !bit;
        }
    }

    pub fn contains(self, sig: i32) -> bool {
        Self::bit(sig).is_some_and(|bit| self.0 & bit != 0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Builder form of [`SigSet::add`]
    #[must_use]
    pub fn with(mut self, sig: i32) -> Self {
        self.add(sig);
        self
    }

    /// Member signal numbers in ascending order
    pub fn iter(self) -> impl Iterator<Item = i32> {
        (1..=MAX_SIGNAL).filter(move |&sig| self.contains(sig))
    }
}

impl FromIterator<i32> for SigSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut set = SigSet::new();
        for sig in iter {
            set.add(sig);
        }
        set
    }
}

impl fmt::Debug for SigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Decoded signalfd record (struct signalfd_siginfo)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalInfo {
    pub signo: u32,
    pub errno: i32,
    pub code: i32,
    /// Sender PID
    pub pid: u32,
    /// Sender real UID
    pub uid: u32,
    /// File descriptor (SIGIO)
    pub fd: i32,
    /// Kernel timer ID (POSIX timers)
    pub tid: u32,
    /// Band event (SIGIO)
    pub band: u32,
    /// Overrun count (POSIX timers)
    pub overrun: u32,
    pub trapno: u32,
    /// Exit status or signal (SIGCHLD)
    pub status: i32,
    /// Integer sent by sigqueue
    pub int: i32,
    /// Pointer sent by sigqueue
    pub ptr: u64,
    pub utime: u64,
    pub stime: u64,
    /// Fault address (SIGILL, SIGFPE, SIGSEGV, SIGBUS)
    pub addr: u64,
    pub addr_lsb: u16,
    /// Syscall number (SIGSYS)
    pub syscall: i32,
    /// Syscall instruction address (SIGSYS)
    pub call_addr: u64,
    /// Audit architecture (SIGSYS)
    pub arch: u32,
}

impl SignalInfo {
    /// Decode one native-endian record
    pub fn from_bytes(buf: &[u8; SIGNAL_INFO_SIZE]) -> Self {
        let u32_at = |off: usize| {
            u32::from_ne_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
        };
        let i32_at = |off: usize| u32_at(off) as i32;
        let u64_at = |off: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&buf[off..off + 8]);
            u64::from_ne_bytes(b)
        };

        Self {
            signo: u32_at(0),
            errno: i32_at(4),
            code: i32_at(8),
            pid: u32_at(12),
            uid: u32_at(16),
            fd: i32_at(20),
            tid: u32_at(24),
            band: u32_at(28),
            overrun: u32_at(32),
            trapno: u32_at(36),
            status: i32_at(40),
            int: i32_at(44),
            ptr: u64_at(48),
            utime: u64_at(56),
            stime: u64_at(64),
            addr: u64_at(72),
            addr_lsb: u16::from_ne_bytes([buf[80], buf[81]]),
            // 82..84 padding
            syscall: i32_at(84),
            call_addr: u64_at(88),
            arch: u32_at(96),
            // 100..128 reserved
        }
    }
}
