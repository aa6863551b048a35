//! Server configuration

use std::path::PathBuf;

/// Configuration for the palmlines server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (default: 127.0.0.1:5000)
    pub addr: String,
    /// Where uploaded photographs are stored (default: uploads)
    pub upload_dir: PathBuf,
    /// Where rendered overlays are written (default: results)
    pub result_dir: PathBuf,
    /// Largest accepted request body in bytes (default: 16 MiB)
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            result_dir: PathBuf::from("results"),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `PALMLINES_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(addr) = lookup("PALMLINES_ADDR") {
            config.addr = addr;
        }
        if let Some(dir) = lookup("PALMLINES_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PALMLINES_RESULT_DIR") {
            config.result_dir = PathBuf::from(dir);
        }
        match lookup("PALMLINES_MAX_UPLOAD_BYTES").map(|v| v.parse::<usize>()) {
            Some(Ok(bytes)) => config.max_upload_bytes = bytes,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "ignoring invalid PALMLINES_MAX_UPLOAD_BYTES")
            }
            None => {}
        }
        config
    }
}
