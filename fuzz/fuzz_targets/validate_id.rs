#![no_main]

use libfuzzer_sys::fuzz_target;
use dockyard_core::validate;

fuzz_target!(|data: &str| {
    let _ = validate::require_id(data, "id");
    let _ = validate::require_reference(data, "name");
    let _ = validate::require_port(data, "port");
    let _ = validate::require_signal(data, "signal");
    let _ = validate::require_base64(data, "Data");
    let _ = validate::require_swarm_token(data, "JoinToken");
});
