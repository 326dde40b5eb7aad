#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed databases must be rejected or answered, never panic
    if let Ok(reader) = ipdb::Reader::from_bytes(data.to_vec()) {
        let _ = reader.find("8.8.8.8", "CN");
        let _ = reader.find("2001:4860:4860::8888", "EN");
    }
});
