#![no_main]

use formcheck::accessor::{get, set};
use formcheck::{Node, Path};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // The first byte picks the split between path text and JSON data.
    let split = data[0] as usize % data.len();
    let (path_bytes, value_bytes) = data.split_at(split);
    let text = String::from_utf8_lossy(path_bytes);

    let Ok(path) = Path::parse(&text) else {
        return;
    };
    if Path::parse(&path.to_string()).as_ref() != Ok(&path) {
        panic!("path display did not round-trip: {:?}", text);
    }

    let Ok(value) = serde_json::from_slice::<serde_json::Value>(value_bytes) else {
        return;
    };
    let root = Node::from(value);
    let _ = get(&root, &path);

    let written = Node::from("fuzz");
    if let Ok(next) = set(&root, &path, written.clone()) {
        assert_eq!(get(&next, &path), Some(&written), "set/get mismatch at {}", path);
    }
});
