// Configuration for both flows. Values come from environment variables;
// `from_lookup` takes any key -> value source so tests don't touch the
// process environment.

use std::path::PathBuf;
use std::time::Duration;

pub const SEARCH_URL_VAR: &str = "N8N_WEBHOOK_URL";
pub const UPLOAD_URL_VAR: &str = "N8N_UPLOAD_WEBHOOK_URL";
pub const DATA_DIR_VAR: &str = "DATA_DIR";
pub const NAMESPACE_VAR: &str = "PINECONE_NAMESPACE";

pub const DEFAULT_SEARCH_URL: &str = "http://localhost:5678/webhook/pinecone-search";
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:5678/webhook/pinecone-upload";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_NAMESPACE: &str = "default";

pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for the search client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub webhook_url: String,
    pub timeout: Duration,
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        SearchConfig {
            webhook_url: value_or(&lookup, SEARCH_URL_VAR, DEFAULT_SEARCH_URL),
            timeout: SEARCH_TIMEOUT,
        }
    }
}

/// Settings for the batch uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub data_dir: PathBuf,
    pub webhook_url: String,
    pub namespace: String,
    pub timeout: Duration,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        UploadConfig {
            data_dir: PathBuf::from(value_or(&lookup, DATA_DIR_VAR, DEFAULT_DATA_DIR)),
            webhook_url: value_or(&lookup, UPLOAD_URL_VAR, DEFAULT_UPLOAD_URL),
            namespace: value_or(&lookup, NAMESPACE_VAR, DEFAULT_NAMESPACE),
            timeout: UPLOAD_TIMEOUT,
        }
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

// Empty values are treated as unset; anything else is used verbatim.
fn value_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
