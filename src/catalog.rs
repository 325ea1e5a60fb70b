//! Character catalog client.
//!
//! One GET per run against `/characters`, filtered by name prefix. The raw
//! JSON body is handed to [`crate::record::parse_characters`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::CatalogConfig;
use crate::error::{Error, Result};

/// Source of raw character listings.
#[async_trait]
pub trait CharacterSource: Send + Sync {
    async fn fetch(&self, letter: char) -> Result<Value>;
}

pub struct CatalogClient {
    config: CatalogConfig,
    client: Client,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().build()?;
        Ok(Self { config, client })
    }

    fn characters_url(&self) -> String {
        format!("{}/characters", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CharacterSource for CatalogClient {
    async fn fetch(&self, letter: char) -> Result<Value> {
        let url = self.characters_url();
        let prefix = letter.to_string();
        let limit = self.config.limit.to_string();
        debug!("GET {url} nameStartsWith={prefix} limit={limit}");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("nameStartsWith", prefix.as_str()),
                ("limit", limit.as_str()),
                ("ts", self.config.ts.as_str()),
                ("apikey", self.config.api_key.as_str()),
                ("hash", self.config.api_hash.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status { url, status });
        }

        let body: Value = resp.json().await?;
        info!("Catalog response received for '{letter}'");
        Ok(body)
    }
}
