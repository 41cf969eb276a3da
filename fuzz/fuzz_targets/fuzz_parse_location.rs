//! Fuzz target for the feature location parser
//!
//! Feeds arbitrary byte strings to the parser and checks that anything it
//! accepts can be clipped and displayed without panicking.

#![no_main]

use ferro_mirror::location::{clip, parse_location, Window};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if input.len() > 1000 {
            return;
        }

        if let Ok(location) = parse_location(input, "FUZZ01", 0) {
            let _ = location.to_string();
            let _ = clip(&location, Window::new(10, 100));
        }
    }
});
