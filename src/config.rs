use std::{env, path::PathBuf};

const DEFAULT_API_URL: &str = "https://api.geniusfactory.com.br";
const DEFAULT_STORE_PATH: &str = ".geniusfactory/store.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// base url of the mobile api, without trailing slash
    pub api_url: String,

    /// bearer token sent on every request, if any
    pub token: Option<String>,

    /// where the device-local key-value store lives
    pub store_path: PathBuf,
}

impl Config {
    pub fn new(api_url: &str, token: Option<String>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            store_path: store_path.into(),
        }
    }

    /// Reads `GENIUS_API_URL`, `GENIUS_API_TOKEN` and `GENIUS_STORE_PATH`.
    /// Call `dotenv::dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Self {
        let api_url = env::var("GENIUS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let token = env::var("GENIUS_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let store_path =
            env::var("GENIUS_STORE_PATH").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());

        Self::new(&api_url, token, store_path)
    }
}
