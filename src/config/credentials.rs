// src/config/credentials.rs
use std::env;

use crate::error::PipelineError;

pub const ENV_PAGE_ID: &str = "FACEBOOK_PAGE_ID";
pub const ENV_ACCESS_TOKEN: &str = "FACEBOOK_ACCESS_TOKEN";
pub const ENV_GEMINI_KEY: &str = "GEMINI_API_KEY";
pub const ENV_UNSPLASH_KEY: &str = "UNSPLASH_API_KEY";

/// Secrets read from the process environment (after `.env` is loaded).
#[derive(Clone)]
pub struct Credentials {
    pub page_id: String,
    pub access_token: String,
    pub gemini_api_key: String,
    /// Image search is disabled without it.
    pub unsplash_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only lengths; the values never reach logs.
        f.debug_struct("Credentials")
            .field("page_id_len", &self.page_id.len())
            .field("access_token_len", &self.access_token.len())
            .field("gemini_api_key_len", &self.gemini_api_key.len())
            .field("unsplash", &self.unsplash_api_key.is_some())
            .finish()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Credentials {
    /// Reads all credentials; the error names every missing required variable.
    pub fn from_env() -> Result<Self, PipelineError> {
        let page_id = non_empty(ENV_PAGE_ID);
        let access_token = non_empty(ENV_ACCESS_TOKEN);
        let gemini_api_key = non_empty(ENV_GEMINI_KEY);

        match (page_id, access_token, gemini_api_key) {
            (Some(page_id), Some(access_token), Some(gemini_api_key)) => Ok(Self {
                page_id,
                access_token,
                gemini_api_key,
                unsplash_api_key: non_empty(ENV_UNSPLASH_KEY),
            }),
            (p, t, g) => {
                let missing: Vec<&str> = [
                    (ENV_PAGE_ID, p.is_none()),
                    (ENV_ACCESS_TOKEN, t.is_none()),
                    (ENV_GEMINI_KEY, g.is_none()),
                ]
                .into_iter()
                .filter_map(|(k, miss)| miss.then_some(k))
                .collect();
                Err(PipelineError::Config(format!(
                    "missing required environment variables: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}
