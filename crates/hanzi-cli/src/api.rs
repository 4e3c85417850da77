//! Hanzi API Client

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// API Client for the Hanzi server
pub struct HanziClient {
    client: Client,
    base_url: String,
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct CharacterResponse {
    pub character: String,
    pub pinyin: String,
    pub radical: String,
    pub strokes: u32,
    #[serde(default)]
    pub meaning: Vec<String>,
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub similar: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PopularEntry {
    pub character: String,
    pub visit_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct PopularResponse {
    pub characters: Vec<PopularEntry>,
}

impl HanziClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn word_url(&self, character: &str) -> String {
        format!(
            "{}/api/word?character={}",
            self.base_url,
            urlencoding::encode(character)
        )
    }

    fn popular_url(&self, limit: Option<usize>) -> String {
        match limit {
            Some(limit) => format!("{}/api/popular?limit={}", self.base_url, limit),
            None => format!("{}/api/popular", self.base_url),
        }
    }

    /// Look up one character
    pub async fn lookup(&self, character: &str) -> Result<CharacterResponse> {
        let resp = self
            .client
            .get(self.word_url(character))
            .send()
            .await
            .context("Failed to connect to Hanzi API")?;

        parse(resp).await
    }

    /// Most visited characters
    pub async fn popular(&self, limit: Option<usize>) -> Result<PopularResponse> {
        let resp = self
            .client
            .get(self.popular_url(limit))
            .send()
            .await
            .context("Failed to connect to Hanzi API")?;

        parse(resp).await
    }
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("API error ({}): {}", status, body);
    }

    resp.json().await.context("Failed to parse response")
}
