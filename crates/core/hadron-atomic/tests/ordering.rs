use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use hadron_atomic::{acquire_fence, load_acquire, load_relaxed, release_fence, store_relaxed, store_release};

/// Payload words written before the flag is published.
const PAYLOAD: usize = 8;

#[test]
#[cfg_attr(miri, ignore)]
fn release_store_publishes_payload_to_acquire_load() {
    for round in 1..=500u32 {
        let payload: Arc<[AtomicU32; PAYLOAD]> = Arc::new(core::array::from_fn(|_| AtomicU32::new(0)));
        let flag = Arc::new(AtomicU32::new(0));

        let producer = {
            let payload = Arc::clone(&payload);
            let flag = Arc::clone(&flag);
            thread::spawn(move || unsafe {
                for (i, slot) in payload.iter().enumerate() {
                    store_relaxed(slot.as_ptr(), round * 100 + u32::try_from(i).unwrap());
                }
                store_release(flag.as_ptr(), round);
            })
        };

        unsafe {
            while load_acquire(flag.as_ptr()) != round {
                core::hint::spin_loop();
            }
            for (i, slot) in payload.iter().enumerate() {
                assert_eq!(
                    load_relaxed(slot.as_ptr()),
                    round * 100 + u32::try_from(i).unwrap(),
                    "round {round}, slot {i}"
                );
            }
        }
        producer.join().unwrap();
    }
}

#[test]
#[cfg_attr(miri, ignore)]
fn byte_flag_handoff() {
    for _ in 0..200 {
        let data = Arc::new(AtomicU64::new(0));
        let flag = Arc::new(AtomicU32::new(0));

        let producer = {
            let data = Arc::clone(&data);
            let flag = Arc::clone(&flag);
            thread::spawn(move || {
                data.store(0x0123_4567_89ab_cdef, Ordering::Relaxed);
                unsafe { store_release(flag.as_ptr().cast::<u8>(), 1) };
            })
        };

        let byte = flag.as_ptr().cast::<u8>();
        while unsafe { load_acquire(byte) } == 0 {
            core::hint::spin_loop();
        }
        assert_eq!(data.load(Ordering::Relaxed), 0x0123_4567_89ab_cdef);
        producer.join().unwrap();
    }
}

#[test]
#[cfg_attr(miri, ignore)]
fn explicit_fences_around_relaxed_access() {
    for round in 1..=200u32 {
        let data = Arc::new(AtomicU32::new(0));
        let flag = Arc::new(AtomicU32::new(0));

        let producer = {
            let data = Arc::clone(&data);
            let flag = Arc::clone(&flag);
            thread::spawn(move || unsafe {
                store_relaxed(data.as_ptr(), round);
                release_fence();
                store_relaxed(flag.as_ptr(), 1);
            })
        };

        unsafe {
            while load_relaxed(flag.as_ptr()) == 0 {
                core::hint::spin_loop();
            }
            acquire_fence();
            assert_eq!(load_relaxed(data.as_ptr()), round);
        }
        producer.join().unwrap();
    }
}
