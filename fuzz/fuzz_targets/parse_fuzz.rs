#![no_main]
use libfuzzer_sys::fuzz_target;
use oxiups::ups::patch::Patch;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the parser — only return errors.
    if let Ok(patch) = Patch::parse(data) {
        // Anything that parses must reserialize to the identical bytes.
        assert_eq!(patch.to_bytes(), data);
    }
});
