/*!
 * Event Counter Tests
 * Signal/wait semantics for standard and semaphore eventfds
 */

use kernfd::handles::{COUNTER_MAX, COUNTER_RECORD_SIZE};
use kernfd::{Closeable, EventFd, FdError, Pollable, Signaler};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_signal_then_wait_accumulates() {
    let efd = EventFd::new(0).unwrap();
    efd.signal(3).unwrap();
    efd.signal(4).unwrap();
    assert_eq!(efd.wait().unwrap(), 7);
    assert_eq!(efd.wait(), Err(FdError::WouldBlock));
}

#[test]
fn test_initial_value_is_readable() {
    let efd = EventFd::new(42).unwrap();
    assert!(!efd.is_semaphore());
    assert_eq!(efd.wait().unwrap(), 42);
}

#[test]
fn test_empty_counter_would_block() {
    let efd = EventFd::new(0).unwrap();
    assert_eq!(efd.wait(), Err(FdError::WouldBlock));
}

#[test]
fn test_signal_zero_is_noop() {
    let efd = EventFd::new(0).unwrap();
    efd.signal(0).unwrap();
    assert_eq!(efd.wait(), Err(FdError::WouldBlock));

    efd.signal(5).unwrap();
    efd.signal(0).unwrap();
    assert_eq!(efd.wait().unwrap(), 5);
}

#[test]
fn test_semaphore_mode_hands_out_units() {
    let n = 5;
    let efd = EventFd::semaphore(n).unwrap();
    assert!(efd.is_semaphore());
    for _ in 0..n {
        assert_eq!(efd.wait().unwrap(), 1);
    }
    assert_eq!(efd.wait(), Err(FdError::WouldBlock));
}

#[test]
fn test_overflow_would_block() {
    let efd = EventFd::new(0).unwrap();
    efd.signal(COUNTER_MAX).unwrap();
    assert_eq!(efd.signal(1), Err(FdError::WouldBlock));
    assert_eq!(efd.wait().unwrap(), COUNTER_MAX);
}

#[test]
fn test_all_ones_is_rejected_by_kernel() {
    let efd = EventFd::new(0).unwrap();
    assert_eq!(efd.signal(u64::MAX), Err(FdError::InvalidParameter));
}

#[test]
fn test_peek_is_unsupported() {
    let efd = EventFd::new(9).unwrap();
    assert!(matches!(efd.peek(), Err(FdError::Unsupported(_))));
    // Counter is untouched
    assert_eq!(efd.wait().unwrap(), 9);
}

#[test]
fn test_raw_record_variants() {
    let efd = EventFd::new(0).unwrap();
    let mut record = [0u8; 12];
    record[..COUNTER_RECORD_SIZE].copy_from_slice(&11u64.to_ne_bytes());
    assert_eq!(efd.write_from(&record).unwrap(), COUNTER_RECORD_SIZE);

    let mut out = [0u8; 16];
    assert_eq!(efd.read_into(&mut out).unwrap(), COUNTER_RECORD_SIZE);
    let mut value = [0u8; COUNTER_RECORD_SIZE];
    value.copy_from_slice(&out[..COUNTER_RECORD_SIZE]);
    assert_eq!(u64::from_ne_bytes(value), 11);

    assert_eq!(efd.read_into(&mut [0u8; 7]), Err(FdError::InvalidParameter));
}

#[test]
fn test_closed_handle() {
    let efd = EventFd::new(1).unwrap();
    efd.close().unwrap();
    efd.close().unwrap();
    assert_eq!(efd.signal(1), Err(FdError::Closed));
    assert_eq!(efd.wait(), Err(FdError::Closed));
    // Zero delta never reaches the descriptor
    assert_eq!(efd.signal(0), Ok(()));
}

#[test]
fn test_cross_thread_signaling() {
    let efd = Arc::new(EventFd::new(0).unwrap());
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let efd = Arc::clone(&efd);
            thread::spawn(move || {
                for _ in 0..100 {
                    efd.signal(1).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }
    assert_eq!(efd.wait().unwrap(), 400);
}

#[test]
fn test_signaler_trait_object() {
    let signaler: Box<dyn Signaler> = Box::new(EventFd::new(0).unwrap());
    signaler.signal(2).unwrap();
    assert_eq!(signaler.wait().unwrap(), 2);
    signaler.close().unwrap();
    assert_eq!(signaler.fd(), -1);
}

#[test]
fn test_duplicate_shares_counter() {
    let efd = EventFd::new(0).unwrap();
    let dup = efd.descriptor().duplicate().unwrap();
    efd.signal(6).unwrap();

    let mut buf = [0u8; COUNTER_RECORD_SIZE];
    assert_eq!(dup.read(&mut buf).unwrap(), COUNTER_RECORD_SIZE);
    assert_eq!(u64::from_ne_bytes(buf), 6);
    assert_eq!(efd.wait(), Err(FdError::WouldBlock));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_two_signals_sum(a in 0u64..1_000_000_000_000u64, b in 0u64..1_000_000_000_000u64) {
        let efd = EventFd::new(0).unwrap();
        efd.signal(a).unwrap();
        efd.signal(b).unwrap();
        if a + b == 0 {
            prop_assert_eq!(efd.wait(), Err(FdError::WouldBlock));
        } else {
            prop_assert_eq!(efd.wait().unwrap(), a + b);
            prop_assert_eq!(efd.wait(), Err(FdError::WouldBlock));
        }
    }
}
