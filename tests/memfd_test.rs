/*!
 * Memory File Tests
 * Sizing, sealing and byte I/O on anonymous memory files
 */

use kernfd::{Closeable, FdError, Handle, MemFd, MemFdOptions, Seals};
use pretty_assertions::assert_eq;
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;

/// Whole contents through a fresh open file description (offset 0)
fn contents(mfd: &MemFd) -> Vec<u8> {
    std::fs::read(format!("/proc/self/fd/{}", mfd.as_raw_fd())).unwrap()
}

#[test]
fn test_new_file_is_empty() {
    let mfd = MemFd::new("empty").unwrap();
    assert_eq!(mfd.name(), "empty");
    assert!(!mfd.sealing_allowed());
    assert_eq!(mfd.size().unwrap(), 0);
    assert!(mfd.descriptor().close_on_exec().unwrap());
}

#[test]
fn test_resize_grow_and_shrink() {
    let mfd = MemFd::new("resize").unwrap();
    mfd.resize(4096).unwrap();
    assert_eq!(mfd.size().unwrap(), 4096);
    assert!(contents(&mfd).iter().all(|&b| b == 0));

    mfd.resize(1024).unwrap();
    assert_eq!(mfd.size().unwrap(), 1024);

    mfd.resize(0).unwrap();
    assert_eq!(mfd.size().unwrap(), 0);
}

#[test]
fn test_resize_rejects_out_of_range() {
    let mfd = MemFd::new("huge").unwrap();
    assert_eq!(mfd.resize(u64::MAX), Err(FdError::InvalidParameter));
    assert_eq!(mfd.size().unwrap(), 0);
}

#[test]
fn test_write_extends_and_reads_back() {
    let mfd = MemFd::new("bytes").unwrap();
    assert_eq!(mfd.write(b"hello world").unwrap(), 11);
    assert_eq!(mfd.size().unwrap(), 11);
    assert_eq!(contents(&mfd), b"hello world");

    // Offset sits at the end after writing
    let mut buf = [0u8; 4];
    assert_eq!(mfd.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_io_traits() {
    let mut mfd = MemFd::new("io").unwrap();
    mfd.write_all(b"abc").unwrap();
    (&mfd).write_all(b"def").unwrap();
    mfd.flush().unwrap();
    assert_eq!(contents(&mfd), b"abcdef");

    let mut rest = Vec::new();
    mfd.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn test_io_error_kind_after_close() {
    let mut mfd = MemFd::new("io-closed").unwrap();
    mfd.close().unwrap();
    let err = mfd.write_all(b"x").unwrap_err();
    assert_eq!(err.raw_os_error(), Some(nix::libc::EBADF));
}

#[test]
fn test_handle_trait_object() {
    let handle: Box<dyn Handle> = Box::new(MemFd::new("dyn").unwrap());
    assert_eq!(handle.write(b"xyz").unwrap(), 3);
    handle.close().unwrap();
    assert_eq!(handle.write(b"xyz"), Err(FdError::Closed));
}

#[test]
fn test_unsealable_file_rejects_seals() {
    let mfd = MemFd::new("plain").unwrap();
    // The kernel reports SEAL on files created without sealing
    assert_eq!(mfd.current_seals().unwrap(), Seals::SEAL);
    assert_eq!(mfd.add_seals(Seals::SHRINK), Err(FdError::PermissionDenied));
}

#[test]
fn test_shrink_seal_allows_growth() {
    let mfd = MemFd::sealable("shrink").unwrap();
    assert!(mfd.sealing_allowed());
    assert_eq!(mfd.current_seals().unwrap(), Seals::empty());

    mfd.resize(1024).unwrap();
    mfd.add_seals(Seals::SHRINK).unwrap();
    assert_eq!(mfd.current_seals().unwrap(), Seals::SHRINK);

    assert_eq!(mfd.resize(512), Err(FdError::PermissionDenied));
    mfd.resize(2048).unwrap();
    assert_eq!(mfd.size().unwrap(), 2048);
}

#[test]
fn test_grow_seal_allows_shrink() {
    let mfd = MemFd::sealable("grow").unwrap();
    mfd.resize(1024).unwrap();
    mfd.add_seals(Seals::GROW).unwrap();

    assert_eq!(mfd.resize(2048), Err(FdError::PermissionDenied));
    mfd.resize(256).unwrap();
    assert_eq!(mfd.size().unwrap(), 256);
}

#[test]
fn test_seals_accumulate() {
    let mfd = MemFd::sealable("accumulate").unwrap();
    mfd.add_seals(Seals::SHRINK).unwrap();
    mfd.add_seals(Seals::GROW).unwrap();
    assert_eq!(mfd.current_seals().unwrap(), Seals::SHRINK | Seals::GROW);
}

#[test]
fn test_write_seal_blocks_writes() {
    let mfd = MemFd::sealable("readonly").unwrap();
    mfd.write(b"frozen").unwrap();
    mfd.add_seals(Seals::WRITE).unwrap();
    assert_eq!(mfd.write(b"more"), Err(FdError::PermissionDenied));
    assert_eq!(contents(&mfd), b"frozen");
}

#[test]
fn test_seal_seal_blocks_further_seals() {
    let mfd = MemFd::sealable("final").unwrap();
    mfd.add_seals(Seals::SEAL).unwrap();
    assert_eq!(mfd.add_seals(Seals::GROW), Err(FdError::PermissionDenied));
    assert_eq!(mfd.current_seals().unwrap(), Seals::SEAL);
    mfd.resize(4096).unwrap();
}

#[test]
fn test_options_without_cloexec() {
    let options = MemFdOptions::new().with_close_on_exec(false);
    let mfd = MemFd::with_options("inherit", options).unwrap();
    assert!(!mfd.descriptor().close_on_exec().unwrap());
}

#[test]
fn test_invalid_names() {
    assert_eq!(MemFd::new("nul\0byte").unwrap_err(), FdError::InvalidParameter);
    let long = "n".repeat(kernfd::handles::MAX_NAME_LEN + 1);
    assert_eq!(MemFd::new(&long).unwrap_err(), FdError::InvalidParameter);
    assert!(MemFd::new("").is_ok());
}

#[test]
fn test_closed_memfd() {
    let mfd = MemFd::sealable("closed").unwrap();
    mfd.close().unwrap();
    mfd.close().unwrap();
    assert!(!mfd.is_valid());
    assert_eq!(mfd.resize(10), Err(FdError::Closed));
    assert_eq!(mfd.size(), Err(FdError::Closed));
    assert_eq!(mfd.add_seals(Seals::GROW), Err(FdError::Closed));
    assert_eq!(mfd.current_seals(), Err(FdError::Closed));
    assert_eq!(mfd.write(b"x"), Err(FdError::Closed));
    // Name survives close
    assert_eq!(mfd.name(), "closed");
}
