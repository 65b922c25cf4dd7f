/*!
 * Anonymous Memory Handle (memfd)
 *
 * Memory-backed file with no filesystem path. Starts empty, zero-fills on
 * growth, and optionally accepts seals that permanently restrict resizing
 * and writing.
 */

pub mod types;

pub use types::{MemFdOptions, Seals, MAX_NAME_LEN};

use crate::core::sys;
use crate::core::{Closeable, Descriptor, FdError, FdResult, Handle, Platform, Pollable};
use log::debug;
use std::ffi::CStr;
use std::fmt;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Anonymous memory file
///
/// The name lives in an inline buffer, so creation does not allocate.
pub struct MemFd {
    fd: Descriptor,
    name: [u8; MAX_NAME_LEN + 1],
    name_len: usize,
    sealing_allowed: bool,
}

impl MemFd {
    /// Plain memory file; sealing not allowed
    pub fn new(name: &str) -> FdResult<Self> {
        Self::with_options(name, MemFdOptions::default())
    }

    /// Memory file that accepts seals
    pub fn sealable(name: &str) -> FdResult<Self> {
        Self::with_options(name, MemFdOptions::default().with_sealing(true))
    }

    /// Memory file backed by huge pages; sizes must be multiples of the huge page size
    pub fn huge_pages(name: &str) -> FdResult<Self> {
        Self::with_options(name, MemFdOptions::default().with_huge_pages(true))
    }

    pub fn with_options(name: &str, options: MemFdOptions) -> FdResult<Self> {
        let linux = Platform::current().linux;
        let mut flags = 0;
        if options.close_on_exec {
            flags |= linux.mfd_cloexec;
        }
        if options.allow_sealing {
            flags |= linux.mfd_allow_sealing;
        }
        if options.huge_pages {
            flags |= linux.mfd_hugetlb;
        }

        let mut buf = [0u8; MAX_NAME_LEN + 1];
        let raw = sys::memfd_create(encode_name(name, &mut buf)?, flags)?;
        debug!("memfd created: fd={}, name={:?}, flags={:#x}", raw, name, flags);
        Ok(Self {
            fd: Descriptor::adopt(raw),
            name: buf,
            name_len: name.len(),
            sealing_allowed: options.allow_sealing,
        })
    }

    /// Name given at creation (shown in /proc/<pid>/fd)
    #[inline]
    pub fn name(&self) -> &str {
        // Copied from a &str at creation, so always valid UTF-8
        std::str::from_utf8(&self.name[..self.name_len]).unwrap_or_default()
    }

    #[inline]
    pub fn sealing_allowed(&self) -> bool {
        self.sealing_allowed
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.fd.is_valid()
    }

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.fd
    }

    pub fn close(&self) -> FdResult<()> {
        self.fd.close()
    }

    /// Read at the current file offset
    pub fn read(&self, buf: &mut [u8]) -> FdResult<usize> {
        self.fd.read(buf)
    }

    /// Write at the current file offset
    pub fn write(&self, buf: &[u8]) -> FdResult<usize> {
        self.fd.write(buf)
    }

    /// Grow (zero-filled) or shrink to `size` bytes
    ///
    /// Fails with `PermissionDenied` when the SHRINK seal blocks a shrink
    /// or the GROW seal blocks a growth; the two are checked independently.
    pub fn resize(&self, size: u64) -> FdResult<()> {
        let size = i64::try_from(size).map_err(|_| FdError::InvalidParameter)?;
        let raw = self.fd.live()?;
        sys::ftruncate(raw, size)?;
        Ok(())
    }

    pub fn size(&self) -> FdResult<u64> {
        let raw = self.fd.live()?;
        let size = sys::fstat_size(raw)?;
        Ok(size as u64)
    }

    /// Add seals; existing seals are kept
    ///
    /// Fails with `PermissionDenied` if sealing was not allowed at creation
    /// or `Seals::SEAL` is already set.
    pub fn add_seals(&self, seals: Seals) -> FdResult<()> {
        let raw = self.fd.live()?;
        sys::add_seals(raw, seals.bits() as i32)?;
        debug!("memfd {:?}: added seals {:?}", self.name(), seals);
        Ok(())
    }

    pub fn current_seals(&self) -> FdResult<Seals> {
        let raw = self.fd.live()?;
        let bits = sys::seals(raw)?;
        Ok(Seals::from_bits_retain(bits as u32))
    }
}

/// Copy `name` into `buf` as a C string without allocating
fn encode_name<'a>(name: &str, buf: &'a mut [u8; MAX_NAME_LEN + 1]) -> FdResult<&'a CStr> {
    let bytes = name.as_bytes();
    if bytes.len() > MAX_NAME_LEN || bytes.contains(&0) {
        return Err(FdError::InvalidParameter);
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    buf[bytes.len()] = 0;
    CStr::from_bytes_with_nul(&buf[..=bytes.len()]).map_err(|_| FdError::InvalidParameter)
}

impl fmt::Debug for MemFd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemFd")
            .field("fd", &self.fd)
            .field("name", &self.name())
            .field("sealing_allowed", &self.sealing_allowed)
            .finish()
    }
}

impl AsRawFd for MemFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Pollable for MemFd {
    fn fd(&self) -> RawFd {
        self.fd.raw()
    }
}

impl Closeable for MemFd {
    fn close(&self) -> FdResult<()> {
        self.fd.close()
    }
}

impl Handle for MemFd {
    fn read(&self, buf: &mut [u8]) -> FdResult<usize> {
        MemFd::read(self, buf)
    }

    fn write(&self, buf: &[u8]) -> FdResult<usize> {
        MemFd::write(self, buf)
    }
}

impl io::Read for &MemFd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(MemFd::read(self, buf)?)
    }
}

impl io::Write for &MemFd {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(MemFd::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for MemFd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }
}

impl io::Write for MemFd {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
