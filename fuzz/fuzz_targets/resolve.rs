#![no_main]
use libfuzzer_sys::fuzz_target;
use nanoid_columns::{ColumnDecls, Config};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let specs = ColumnDecls::from_value(&value)
        .resolve_with(&Config::new())
        .expect("Lenient declarations always resolve");
    for spec in specs {
        assert!(!spec.name.is_empty());
        assert!(spec.size > 0);
        assert!(!spec.alphabet.is_empty());
    }
});
