#![no_main]
use libfuzzer_sys::fuzz_target;
use oxiups::engine;
use oxiups::ups::Direction;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the split point between "source" and "target".
    let split = (data[0] as usize) % data.len();
    let payload = &data[1..];
    let split = split.min(payload.len());
    let (source, target) = payload.split_at(split);

    let patch = engine::build(source, target).unwrap();

    let (out, dir) = engine::apply(&patch, source).unwrap();
    assert_eq!(out, target);
    assert_eq!(dir, Direction::Forward);

    let (back, dir) = engine::apply(&patch, target).unwrap();
    assert_eq!(back, source);
    if source != target {
        assert_eq!(dir, Direction::Reverse);
    }
});
