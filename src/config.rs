//! Process configuration, read from MAINTRACK_* environment variables with
//! defaults suitable for local development. Constructed once at startup and
//! passed down explicitly; nothing here is ambient.

use tracing::warn;

pub const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        let http_port = std::env::var("MAINTRACK_HTTP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);
        let jwt_secret = match std::env::var("MAINTRACK_JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("MAINTRACK_JWT_SECRET not set; using the development default");
                "maintrack-dev-secret".to_string()
            }
        };
        Config { http_port, jwt_secret }
    }
}
