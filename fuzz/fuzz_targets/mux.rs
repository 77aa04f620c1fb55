#![no_main]

use libfuzzer_sys::fuzz_target;

use dockyard_client::mux::{split_frames, HEADER_LEN};

fuzz_target!(|data: &[u8]| {
    if let Ok(frames) = split_frames(data) {
        let payload: usize = frames.iter().map(|f| f.data.len()).sum();
        assert!(payload + frames.len() * HEADER_LEN <= data.len());
    }
});
