#![no_main]

use libfuzzer_sys::fuzz_target;

use dockyard_client::resources::containers::decode_path_stat;

fuzz_target!(|data: &str| {
    let _ = decode_path_stat(data);
});
