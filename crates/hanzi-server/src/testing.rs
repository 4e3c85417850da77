//! In-memory fakes shared by the server's unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tokio::sync::Barrier;
use tower::ServiceExt;

use hanzi::domain::rank_popularity;
use hanzi::{
    BackfillConfig, CharacterBackfill, CharacterRecord, CharacterRepository, ChatMessage,
    CompletionOptions, CompletionResponse, DomainError, Glyph, LlmProvider, PopularityEntry,
    TokenUsage, ViewEvent, ViewHistoryRepository,
};

use crate::application::LookupService;
use crate::AppState;

pub fn wo_json() -> String {
    r#"{"character":"我","pinyin":"wǒ","radical":"戈","strokes":7,"meaning":["第一人称代词"],"words":["我们","自我"],"similar":["找","戒","成"]}"#
        .to_string()
}

/// A stored record; `我` carries its real data
pub fn record(c: &str) -> CharacterRecord {
    let glyph = Glyph::parse(c).unwrap();
    if c == "我" {
        CharacterRecord::new(
            &glyph,
            "wǒ".to_string(),
            "戈".to_string(),
            7,
            vec!["第一人称代词".to_string()],
            vec!["我们".to_string(), "自我".to_string()],
            vec!["找".to_string(), "戒".to_string(), "成".to_string()],
        )
    } else {
        CharacterRecord::new(
            &glyph,
            "pinyin".to_string(),
            c.to_string(),
            1,
            vec!["meaning".to_string()],
            Vec::new(),
            Vec::new(),
        )
    }
}

pub fn fast_backfill_config() -> BackfillConfig {
    BackfillConfig {
        max_attempts: 3,
        retry_delay: Duration::from_millis(1),
        request_timeout: Duration::from_secs(5),
        batch_size: 10,
    }
}

#[derive(Default)]
pub struct InMemoryCharacterRepository {
    records: Mutex<HashMap<String, CharacterRecord>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    /// Reject every insert as a conflict without storing anything
    pub phantom_conflicts: AtomicBool,
    pub insert_conflicts: AtomicU32,
}

impl InMemoryCharacterRepository {
    pub fn with(records: Vec<CharacterRecord>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.records.lock().unwrap();
            for record in records {
                map.insert(record.character.clone(), record);
            }
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    async fn find(&self, character: &Glyph) -> Result<Option<CharacterRecord>, DomainError> {
        self.check_available()?;
        Ok(self.records.lock().unwrap().get(character.as_str()).cloned())
    }

    async fn insert(&self, record: &CharacterRecord) -> Result<CharacterRecord, DomainError> {
        self.check_available()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Unavailable("read-only transaction".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        if self.phantom_conflicts.load(Ordering::SeqCst) || records.contains_key(&record.character)
        {
            self.insert_conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(DomainError::Conflict(format!(
                "character \"{}\" already exists",
                record.character
            )));
        }
        records.insert(record.character.clone(), record.clone());
        Ok(record.clone())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        self.check_available()?;
        Ok(self.records.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryViewHistory {
    events: Mutex<Vec<ViewEvent>>,
    pub fail_appends: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl InMemoryViewHistory {
    pub fn visits(&self, c: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.character == c)
            .count()
    }

    pub fn total(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl ViewHistoryRepository for InMemoryViewHistory {
    async fn append(&self, event: &ViewEvent) -> Result<(), DomainError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(DomainError::Unavailable("view_history is read-only".to_string()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn top_visited(&self, limit: usize) -> Result<Vec<PopularityEntry>, DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::Unavailable("connection refused".to_string()));
        }
        let mut counts: HashMap<String, i64> = HashMap::new();
        for event in self.events.lock().unwrap().iter() {
            *counts.entry(event.character.clone()).or_default() += 1;
        }
        let entries = counts
            .into_iter()
            .map(|(character, visit_count)| PopularityEntry {
                character,
                visit_count,
            })
            .collect();
        Ok(rank_popularity(entries, limit))
    }
}

/// Provider that answers every prompt the same way
pub struct StubProvider {
    reply: Result<String, String>,
    gate: Option<Barrier>,
    pub calls: AtomicU32,
}

impl StubProvider {
    pub fn always(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            gate: None,
            calls: AtomicU32::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            gate: None,
            calls: AtomicU32::new(0),
        })
    }

    /// Holds each reply until `callers` requests are in flight
    pub fn gated(reply: impl Into<String>, callers: usize) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            gate: Some(Barrier::new(callers)),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }

        match &self.reply {
            Ok(content) => Ok(CompletionResponse {
                content: content.clone(),
                model: "stub".to_string(),
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            }),
            Err(message) => Err(DomainError::ExternalService(message.clone())),
        }
    }

    fn provider_name(&self) -> &str {
        "stub"
    }

    fn model_id(&self) -> &str {
        "stub-model"
    }
}

/// Application state wired to in-memory fakes
pub fn app_state(
    characters: Arc<InMemoryCharacterRepository>,
    history: Arc<InMemoryViewHistory>,
    provider: Arc<StubProvider>,
) -> AppState {
    let characters: Arc<dyn CharacterRepository> = characters;
    let history: Arc<dyn ViewHistoryRepository> = history;
    let provider: Arc<dyn LlmProvider> = provider;

    AppState {
        lookup: Arc::new(LookupService::new(
            characters,
            history,
            CharacterBackfill::new(provider, Some(fast_backfill_config())),
        )),
    }
}

/// Send a GET request through the router
pub async fn get(router: Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}
