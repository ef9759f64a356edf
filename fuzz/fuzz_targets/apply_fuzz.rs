#![no_main]
use libfuzzer_sys::fuzz_target;
use oxiups::engine;

fuzz_target!(|data: &[u8]| {
    // Apply arbitrary patch bytes to arbitrary input. The applier must
    // never panic, whatever the split.
    let _ = engine::apply(data, &[]);

    if data.len() >= 2 {
        let split = data.len() / 2;
        let (patch, input) = data.split_at(split);
        let _ = engine::apply(patch, input);
    }
});
