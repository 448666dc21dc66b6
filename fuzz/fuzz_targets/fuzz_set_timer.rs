//! Fuzz target: `/set_timer` query decoding
//!
//! Arbitrary URIs must either decode to a minute count or map to a 4xx
//! status, never panic.
//!
//! cargo fuzz run fuzz_set_timer

#![no_main]

use libfuzzer_sys::fuzz_target;
use petfeeder::api;

fuzz_target!(|data: &[u8]| {
    let Ok(uri) = core::str::from_utf8(data) else {
        return;
    };

    match api::parse_set_timer(uri) {
        Ok(minutes) => {
            let text = api::set_timer_text(minutes);
            assert!(!text.is_empty());
        }
        Err(e) => assert!((400..500).contains(&e.status())),
    }
});
