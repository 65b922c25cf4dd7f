/*!
 * Core Traits
 * Capability traits shared by every handle type
 */

use super::errors::FdResult;
use std::os::unix::io::RawFd;

/// A resource whose readiness can be monitored by a poller
pub trait Pollable: Send + Sync {
    /// Underlying descriptor number, `-1` once closed
    fn fd(&self) -> RawFd;
}

/// A pollable resource that can be released
pub trait Closeable: Pollable {
    /// Release the descriptor; later calls are no-ops
    fn close(&self) -> FdResult<()>;
}

/// Byte-stream I/O on a descriptor
pub trait Handle: Closeable {
    /// Returns `WouldBlock` when no data is available
    fn read(&self, buf: &mut [u8]) -> FdResult<usize>;

    /// Returns `WouldBlock` when the descriptor cannot accept data
    fn write(&self, buf: &[u8]) -> FdResult<usize>;
}

/// Counter-style signaling (eventfd)
pub trait Signaler: Closeable {
    /// Add `delta` to the counter; `WouldBlock` if it would overflow
    fn signal(&self, delta: u64) -> FdResult<()>;

    /// Drain the counter; `WouldBlock` if it is zero
    fn wait(&self) -> FdResult<u64>;
}

/// Expiration-counting timers (timerfd)
pub trait Timer: Closeable {
    /// Arm relative to now; `initial_ns == 0` disarms
    fn arm(&self, initial_ns: u64, interval_ns: u64) -> FdResult<()>;

    fn disarm(&self) -> FdResult<()>;

    /// Expirations since the last read; `WouldBlock` if none
    fn read(&self) -> FdResult<u64>;
}
