//! Runtime configuration: data paths, bind address, log filter.

use std::path::PathBuf;

pub const APP_NAME: &str = "TherapyTrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed session lifetime. Tokens are opaque and server-side, so there is
/// no refresh; clients log in again after expiry.
pub const SESSION_LIFETIME_SECS: u64 = 8 * 60 * 60;

pub fn default_log_filter() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info,therapytrack=debug".to_string())
}

/// Per-user data directory, created on first open.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn database_path() -> PathBuf {
    match std::env::var("THERAPYTRACK_DB") {
        Ok(path) => PathBuf::from(path),
        Err(_) => app_data_dir().join("clinic.db"),
    }
}

pub fn bind_addr() -> String {
    std::env::var("THERAPYTRACK_ADDR").unwrap_or_else(|_| "127.0.0.1:8470".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with(APP_NAME));
    }

    #[test]
    fn default_bind_addr_parses() {
        let addr: std::net::SocketAddr = bind_addr().parse().unwrap();
        assert_eq!(addr.port(), 8470);
    }
}
