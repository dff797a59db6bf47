use std::env;
use std::path::PathBuf;

/// Runtime configuration, read from the environment (`.env` honored).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the task API.
    pub api_url: String,
    /// Where the session file lives.
    pub session_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let api_url = env::var("API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        let session_file = env::var("TASKDECK_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("taskdeck_session.json"));
        Self {
            api_url,
            session_file,
        }
    }
}
