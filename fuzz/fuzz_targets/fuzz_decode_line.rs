#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Decoding is total: any line that is not a known record must come back
    // as Unrecognized, never a panic.
    let _ = motorlab_core::telemetry::decode_line(data);
});
