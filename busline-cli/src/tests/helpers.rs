//! Test helpers for writing plan files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary directory addressed through UTF-8 paths.
pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// Three stops around the default depot, without an explicit order.
pub(super) fn sample_plan() -> Value {
    json!({
        "stops": [
            { "id": 1, "name": "Nguyen Van Nam", "latitude": 21.0315, "longitude": 105.8612 },
            { "id": 2, "name": "Tran Thi Mai", "latitude": 21.0245, "longitude": 105.8482 },
            { "id": 3, "name": "Le Van Hung", "lat": 21.0355, "lng": 105.8585,
              "address": "12 Hang Bai" }
        ]
    })
}

pub(super) fn write_plan(path: &Utf8Path, plan: &Value) {
    let payload = serde_json::to_string_pretty(plan).expect("serialise plan");
    write_utf8(path, payload.as_bytes());
}
