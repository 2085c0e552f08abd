use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

use phototag::config::{BackendConfig, LabelingConfig};
use phototag::HttpBackend;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// HTTP backend pointed at the mock server
#[allow(dead_code)]
pub fn backend_for(server: &MockServer) -> Arc<HttpBackend> {
    backend_with_timeout(server, 5)
}

#[allow(dead_code)]
pub fn backend_with_timeout(server: &MockServer, timeout_seconds: u64) -> Arc<HttpBackend> {
    let config = BackendConfig {
        base_url: server.uri(),
        timeout_seconds,
    };
    Arc::new(HttpBackend::new(&config).expect("failed to build backend"))
}

#[allow(dead_code)]
pub fn labeling() -> LabelingConfig {
    LabelingConfig {
        categories: vec![
            "keep".to_string(),
            "work".to_string(),
            "screenshot".to_string(),
            "meme".to_string(),
        ],
        ..LabelingConfig::default()
    }
}

#[allow(dead_code)]
pub fn encoded(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Successful image body; the image bytes are the filename's bytes
#[allow(dead_code)]
pub fn image_body(filename: &str, predicted: Option<&str>, stats: Value) -> Value {
    json!({
        "success": true,
        "filename": filename,
        "image": encoded(filename.as_bytes()),
        "predicted": predicted,
        "stats": stats,
    })
}
