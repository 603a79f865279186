use std::env;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Casafix";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default Gemini model used when GEMINI_MODEL is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Get the application data directory.
/// ~/Casafix/ on all platforms (user-visible, holds the job database).
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Casafix")
}

/// Default path of the job database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("diagnosticos.db")
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "info,casafix=debug"
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. `None` means the AI feature degrades to a 500
    /// response instead of crashing the process.
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    pub gemini_model: String,
    /// Path of the SQLite job database.
    pub database_path: PathBuf,
    /// HTTP listen port.
    pub port: u16,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `GEMINI_API_KEY`, `GEMINI_MODEL`, `CASAFIX_DB_PATH` and `PORT`
    /// are all optional; sensible defaults apply.
    pub fn from_env() -> Self {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let database_path = env::var("CASAFIX_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        Self {
            gemini_api_key,
            gemini_model,
            database_path,
            port,
        }
    }
}
