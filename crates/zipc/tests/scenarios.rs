// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios exercising the public API. Threads stand in for
//! the two separate processes the channel is designed for, the same
//! substitution the original test suite makes between
//! `test_single_thread_lock_step.c` (one thread, strict interleaving) and
//! `test_separate_threads.c` (two threads, relaxed interleaving).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_channel(tag: &str) -> String {
    let n = NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    format!("/zipc_t_{tag}_{pid}_{n}")
}

#[test]
fn single_thread_lock_step() {
    let name = unique_channel("lockstep");
    zipc::unlink(&name).unwrap();

    let sender = zipc::create_sender(&name, 64, 1024).unwrap();
    let receiver = zipc::create_receiver(&name, 64, 1024).unwrap();

    assert!(receiver.receive().unwrap().is_none());

    sender.send(b"hello\0").unwrap();
    let msg = receiver.receive().unwrap().unwrap();
    assert_eq!(msg.as_bytes(), b"hello\0");

    sender.send(b"world\0").unwrap();
    let msg = receiver.receive().unwrap().unwrap();
    assert_eq!(msg.as_bytes(), b"world\0");

    sender.send(b"!\0").unwrap();
    let msg = receiver.receive().unwrap().unwrap();
    assert_eq!(msg.as_bytes(), b"!\0");

    zipc::unlink(&name).unwrap();
}

#[test]
fn separate_thread_hand_off() {
    let name = unique_channel("handoff");
    zipc::unlink(&name).unwrap();
    let name_for_consumer = name.clone();

    let consumer = thread::spawn(move || {
        let receiver = zipc::create_receiver(&name_for_consumer, 64, 1024).unwrap();
        let mut observed = Vec::new();
        while observed.len() < 3 {
            if let Some(msg) = receiver.receive_blocking(Some(Duration::from_secs(2))).unwrap() {
                observed.push(msg.as_bytes().to_vec());
            }
        }
        observed
    });

    thread::sleep(Duration::from_millis(10));
    let producer = thread::spawn(move || {
        let sender = zipc::create_sender(&name, 64, 1024).unwrap();
        for payload in [&b"hello\0"[..], b"world\0", b"!\0"] {
            sender.send(payload).unwrap();
        }
    });

    producer.join().unwrap();
    let observed = consumer.join().unwrap();
    assert_eq!(observed, vec![b"hello\0".to_vec(), b"world\0".to_vec(), b"!\0".to_vec()]);
}

#[test]
fn overflow_drop() {
    let name = unique_channel("overflow");
    zipc::unlink(&name).unwrap();

    let sender = zipc::create_sender(&name, 2, 8).unwrap();
    let receiver = zipc::create_receiver(&name, 2, 8).unwrap();

    assert!(sender.send(b"a").unwrap());
    assert!(sender.send(b"b").unwrap());
    assert!(!sender.send(b"c").unwrap(), "3rd send into a queue_size=2 ring must be dropped");

    assert_eq!(receiver.receive().unwrap().unwrap().as_bytes(), b"a");
    assert_eq!(receiver.receive().unwrap().unwrap().as_bytes(), b"b");
    assert!(receiver.receive().unwrap().is_none());

    zipc::unlink(&name).unwrap();
}

#[test]
fn receiver_first_rendezvous() {
    let name = unique_channel("rendezvous");
    zipc::unlink(&name).unwrap();
    let name_for_receiver = name.clone();

    let ready = Arc::new(AtomicU64::new(0));
    let ready_for_receiver = Arc::clone(&ready);

    let receiver_thread = thread::spawn(move || {
        let receiver = zipc::create_receiver(&name_for_receiver, 4, 16).unwrap();
        let initialized = receiver.wait_for_initialization(Some(Duration::from_secs(2)));
        ready_for_receiver.store(1, Ordering::Release);
        (receiver, initialized)
    });

    thread::sleep(Duration::from_millis(30));
    assert_eq!(ready.load(Ordering::Acquire), 0, "receiver must still be blocked");

    let sender = zipc::create_sender(&name, 4, 16).unwrap();
    let (receiver, initialized) = receiver_thread.join().unwrap();
    assert!(initialized, "receiver must unblock once the sender creates the region");

    sender.send(b"ping").unwrap();
    let msg = receiver.receive_blocking(Some(Duration::from_secs(1))).unwrap().unwrap();
    assert_eq!(msg.as_bytes(), b"ping");

    zipc::unlink(&name).unwrap();
}

#[test]
fn blocking_receive_timeout() {
    let name = unique_channel("timeout");
    zipc::unlink(&name).unwrap();

    let receiver = zipc::create_receiver(&name, 4, 16).unwrap();
    let start = std::time::Instant::now();
    let result = receiver.receive_blocking(Some(Duration::from_millis(50))).unwrap();
    let elapsed = start.elapsed();

    assert!(result.is_none());
    assert!(elapsed >= Duration::from_millis(40), "returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "returned too late: {elapsed:?}");

    zipc::unlink(&name).unwrap();
}

#[test]
fn blocking_receive_wakeup() {
    let name = unique_channel("wakeup");
    zipc::unlink(&name).unwrap();
    let name_for_sender = name.clone();

    let sender_thread = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        let sender = zipc::create_sender(&name_for_sender, 4, 16).unwrap();
        sender.send(b"x\0").unwrap();
    });

    let receiver = zipc::create_receiver(&name, 4, 16).unwrap();
    let start = std::time::Instant::now();
    let msg = receiver
        .receive_blocking(Some(Duration::from_millis(500)))
        .unwrap()
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(msg.as_bytes(), b"x\0");
    assert!(elapsed < Duration::from_millis(500));

    sender_thread.join().unwrap();
    zipc::unlink(&name).unwrap();
}

#[test]
fn ordering_invariant_holds_for_many_sends() {
    let name = unique_channel("ordering");
    zipc::unlink(&name).unwrap();

    let sender = zipc::create_sender(&name, 64, 16).unwrap();
    let receiver = zipc::create_receiver(&name, 64, 16).unwrap();

    for i in 0u8..50 {
        assert!(sender.send(&[i]).unwrap());
        let msg = receiver.receive().unwrap().unwrap();
        assert_eq!(msg.as_bytes(), &[i]);
    }

    zipc::unlink(&name).unwrap();
}

#[test]
fn empty_full_symmetry_holds() {
    let name = unique_channel("symmetry");
    zipc::unlink(&name).unwrap();

    let sender = zipc::create_sender(&name, 8, 16).unwrap();
    let receiver = zipc::create_receiver(&name, 8, 16).unwrap();

    for i in 0u8..8 {
        assert!(sender.send(&[i]).unwrap());
    }
    for i in 0u8..8 {
        assert_eq!(receiver.receive().unwrap().unwrap().as_bytes(), &[i]);
    }
    assert!(receiver.receive().unwrap().is_none());

    zipc::unlink(&name).unwrap();
}

#[test]
fn unlink_is_idempotent_end_to_end() {
    let name = unique_channel("unlink");
    let _sender = zipc::create_sender(&name, 4, 16).unwrap();
    assert!(zipc::unlink(&name).is_ok());
    assert!(zipc::unlink(&name).is_ok());
}

#[test]
fn round_trip_fidelity_for_max_length_payload() {
    let name = unique_channel("fidelity");
    zipc::unlink(&name).unwrap();

    let sender = zipc::create_sender(&name, 4, 32).unwrap();
    let receiver = zipc::create_receiver(&name, 4, 32).unwrap();

    let payload: Vec<u8> = (0..32u8).collect();
    assert!(sender.send(&payload).unwrap());
    let msg = receiver.receive().unwrap().unwrap();
    assert_eq!(msg.as_bytes(), payload.as_slice());
    assert_eq!(msg.len(), 32);

    zipc::unlink(&name).unwrap();
}
