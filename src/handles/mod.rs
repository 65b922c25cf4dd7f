/*!
 * Handles Module
 * Specialized Linux kernel handles layered on Descriptor
 */

pub mod eventfd;
pub mod memfd;
pub mod pidfd;
pub mod signalfd;
pub mod timerfd;

// Re-export for convenience
pub use eventfd::{EventFd, EventFdOptions, COUNTER_MAX, COUNTER_RECORD_SIZE};
pub use memfd::{MemFd, MemFdOptions, Seals, MAX_NAME_LEN};
pub use pidfd::PidFd;
pub use signalfd::{SigSet, SignalFd, SignalInfo, SIGNAL_INFO_SIZE};
pub use timerfd::{Clock, TimerFd, TimerSpec, TIMER_RECORD_SIZE};
