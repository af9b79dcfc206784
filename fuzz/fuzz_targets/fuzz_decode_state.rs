//! Fuzz target: pool state decoding
//!
//! Feeds arbitrary bytes to decode_state(); only 16-byte payloads decode.
//!
//! Run: cargo +nightly fuzz run fuzz_decode_state -- -max_len=64

#![no_main]
use bcl_core::codec::STATE_LEN;
use bcl_core::{decode_state, encode_state};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match decode_state(data) {
        Ok(remaining) => {
            assert_eq!(data.len(), STATE_LEN);
            assert_eq!(&encode_state(remaining)[..], data);
        }
        Err(_) => assert_ne!(data.len(), STATE_LEN),
    }
});
