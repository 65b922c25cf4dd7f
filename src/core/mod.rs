/*!
 * Core Module
 * Descriptor ownership, error translation and platform constants
 */

pub mod descriptor;
pub mod errors;
pub mod platform;
pub(crate) mod sys;
pub mod traits;

// Re-export for convenience
pub use descriptor::Descriptor;
pub use errors::*;
pub use platform::{ControlFlags, Platform};
pub use traits::*;

#[cfg(target_os = "linux")]
pub use platform::LinuxFlags;
