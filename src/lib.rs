/*!
 * kernfd
 * Owning descriptor wrapper and non-blocking Linux kernel handles
 * (eventfd, timerfd, signalfd, pidfd, memfd) for pollers and reactors
 */

#[cfg(not(unix))]
compile_error!("kernfd only supports Unix targets");

pub mod core;

#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
pub mod handles;

// Re-exports
pub use crate::core::{
    Closeable, Descriptor, FdError, FdResult, Handle, Platform, Pollable, Signaler, Timer,
};

#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
pub use handles::{
    Clock, EventFd, EventFdOptions, MemFd, MemFdOptions, PidFd, Seals, SigSet, SignalFd,
    SignalInfo, TimerFd, TimerSpec,
};
