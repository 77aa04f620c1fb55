#![no_main]

use libfuzzer_sys::fuzz_target;

use dockyard_client::resources::{containers, networks};
use dockyard_core::filters::Filters;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(filters) = Filters::from_value(&value) else {
        return;
    };
    let _ = filters.validate(&containers::LIST_FILTERS);
    let _ = filters.validate(&networks::LIST_FILTERS);
    if let Some(encoded) = filters.to_query_value() {
        // 인코딩 결과는 다시 필터로 해석되어야 함
        let reparsed: serde_json::Value =
            serde_json::from_str(&encoded).expect("encoded filters are JSON");
        assert!(Filters::from_value(&reparsed).is_ok());
    }
});
