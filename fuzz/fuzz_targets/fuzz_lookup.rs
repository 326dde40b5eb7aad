#![no_main]
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

/// One node whose children both reference a single "US" record
fn reader() -> &'static ipdb::Reader {
    static READER: OnceLock<ipdb::Reader> = OnceLock::new();
    READER.get_or_init(|| {
        let meta = br#"{"languages":{"EN":0},"node_count":1,"fields":["country"]}"#;
        let mut data = (meta.len() as u32).to_be_bytes().to_vec();
        data.extend_from_slice(meta);
        data.extend_from_slice(&[0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 2, b'U', b'S']);
        ipdb::Reader::from_bytes(data).unwrap()
    })
}

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = std::str::from_utf8(data) {
        let (ip, language) = query.split_once(' ').unwrap_or((query, "EN"));
        let _ = reader().find(ip, language);
    }
});
