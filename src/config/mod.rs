use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Optional for worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string for job queue
    pub redis_url: String,

    /// Directory holding uploads, outputs and processed images
    #[serde(default = "default_media_root")]
    pub media_root: String,

    /// Public base URL the media root is served under
    #[serde(default = "default_media_url")]
    pub media_url: String,

    /// Completion webhook the worker reports to
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,

    /// JPEG quality used by the worker when re-encoding images (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Upper bound for request bodies, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_media_root() -> String {
    "media".to_string()
}

fn default_media_url() -> String {
    "http://localhost:3000/media/".to_string()
}

fn default_webhook_url() -> String {
    "http://localhost:3000/webhook/processing_complete/".to_string()
}

fn default_jpeg_quality() -> u8 {
    50
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Build from explicit key/value pairs (upper-case keys, as in the environment).
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
