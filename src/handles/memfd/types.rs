/*!
 * Memory File Types
 * Seal bits and creation options
 */

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Longest name memfd_create accepts, excluding the terminating NUL
pub const MAX_NAME_LEN: usize = 249;

bitflags! {
    /// Irreversible restrictions on an anonymous memory file
    ///
    /// Bits accumulate and are never cleared. Once `SEAL` is present no
    /// further bits can be added.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Seals: u32 {
        /// Prevent further seals
        const SEAL = 0x1;
        const SHRINK = 0x2;
        const GROW = 0x4;
        const WRITE = 0x8;
        /// Prevent new writes while leaving existing writable mappings usable
        const FUTURE_WRITE = 0x10;
    }
}

/// Creation options for [`super::MemFd`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemFdOptions {
    pub allow_sealing: bool,
    pub huge_pages: bool,
    pub close_on_exec: bool,
}

impl MemFdOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sealing(mut self, allow_sealing: bool) -> Self {
        self.allow_sealing = allow_sealing;
        self
    }

    pub fn with_huge_pages(mut self, huge_pages: bool) -> Self {
        self.huge_pages = huge_pages;
        self
    }

    pub fn with_close_on_exec(mut self, close_on_exec: bool) -> Self {
        self.close_on_exec = close_on_exec;
        self
    }
}

impl Default for MemFdOptions {
    fn default() -> Self {
        Self {
            allow_sealing: false,
            huge_pages: false,
            close_on_exec: true,
        }
    }
}
