//! Fuzz target: pool args decoding
//!
//! Verifies:
//! 1. PoolArgs::decode() never panics on arbitrary bytes
//! 2. Only exactly-55-byte payloads with a zero prefix decode
//! 3. Anything that decodes re-encodes to the same bytes
//!
//! Run: cargo +nightly fuzz run fuzz_decode_args -- -max_len=128

#![no_main]
use bcl_core::codec::{ARGS_LEN, ARGS_PREFIX};
use bcl_core::PoolArgs;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match PoolArgs::decode(data) {
        Ok(args) => {
            assert_eq!(data.len(), ARGS_LEN);
            assert_eq!(&data[..2], &ARGS_PREFIX);
            assert_eq!(&args.encode()[..], data, "decode/encode must be lossless");
        }
        Err(e) => assert_ne!(e.exit_code(), 0),
    }

    // Hex entry point must not panic either
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = PoolArgs::from_hex(s);
    }
});
