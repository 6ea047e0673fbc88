//! Manual cloud backup: whole-state snapshots pushed to and pulled from a
//! remote document store keyed by user id

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use finweb_config::SyncConfig;

use crate::error::{CoreError, CoreResult};
use crate::models::{Card, Movement, Theme};

/// Cloud document for one user; absent parts are left untouched on pull
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Vec<Movement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balances: Option<BTreeMap<String, Decimal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<BTreeMap<String, Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Store reference type
pub type CloudStoreRef = Arc<dyn CloudStore>;

/// Remote document store
#[async_trait]
pub trait CloudStore: Send + Sync {
    /// Write the user's document
    async fn save(&self, user_id: &str, snapshot: &CloudSnapshot) -> CoreResult<()>;

    /// Read the user's document, `None` when it does not exist
    async fn load(&self, user_id: &str) -> CoreResult<Option<CloudSnapshot>>;
}

/// REST document store: documents live at `{base_url}/users/{user_id}`
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> CoreResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &SyncConfig) -> CoreResult<Self> {
        Self::new(
            config.base_url.clone(),
            Some(config.token.clone()),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Document URL for a user
    pub fn document_url(&self, user_id: &str) -> String {
        format!("{}/users/{}", self.base_url, urlencoding::encode(user_id))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl CloudStore for HttpDocumentStore {
    async fn save(&self, user_id: &str, snapshot: &CloudSnapshot) -> CoreResult<()> {
        let url = self.document_url(user_id);
        log::debug!("PUT {}", url);
        let response = self.authorize(self.client.put(&url)).json(snapshot).send().await?;
        if !response.status().is_success() {
            return Err(CoreError::SyncError {
                message: format!("document store answered {} on save", response.status()),
            });
        }
        Ok(())
    }

    async fn load(&self, user_id: &str) -> CoreResult<Option<CloudSnapshot>> {
        let url = self.document_url(user_id);
        log::debug!("GET {}", url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(CoreError::SyncError {
                message: format!("document store answered {} on load", status),
            }),
        }
    }
}

/// In-process store, used when running without a remote and in tests
#[derive(Debug, Default)]
pub struct MemoryCloudStore {
    documents: Mutex<HashMap<String, CloudSnapshot>>,
}

impl MemoryCloudStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CloudStore for MemoryCloudStore {
    async fn save(&self, user_id: &str, snapshot: &CloudSnapshot) -> CoreResult<()> {
        let mut documents = self.documents.lock().await;
        let document = documents.entry(user_id.to_string()).or_insert_with(|| CloudSnapshot {
            expenses: None,
            balances: None,
            cards: None,
            theme: None,
            last_updated: None,
        });
        // Merge: parts absent from the snapshot keep their stored value
        if snapshot.expenses.is_some() {
            document.expenses = snapshot.expenses.clone();
        }
        if snapshot.balances.is_some() {
            document.balances = snapshot.balances.clone();
        }
        if snapshot.cards.is_some() {
            document.cards = snapshot.cards.clone();
        }
        if snapshot.theme.is_some() {
            document.theme = snapshot.theme;
        }
        document.last_updated = snapshot.last_updated;
        Ok(())
    }

    async fn load(&self, user_id: &str) -> CoreResult<Option<CloudSnapshot>> {
        Ok(self.documents.lock().await.get(user_id).cloned())
    }
}

/// Sync activity shown in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Saving,
    Loading,
    Error,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Saving => write!(f, "saving"),
            SyncStatus::Loading => write!(f, "loading"),
            SyncStatus::Error => write!(f, "error"),
        }
    }
}

/// Status report for the sync panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub enabled: bool,
    pub user_id: Option<String>,
    pub status: SyncStatus,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Push/pull coordinator holding the status between requests
pub struct CloudSync {
    store: Option<CloudStoreRef>,
    user_id: Option<String>,
    state: SyncState,
}

impl CloudSync {
    /// `store` is `None` when sync is disabled
    pub fn new(store: Option<CloudStoreRef>, user_id: Option<String>) -> Self {
        let user_id = user_id.filter(|id| !id.trim().is_empty());
        let state = SyncState {
            enabled: store.is_some(),
            user_id: user_id.clone(),
            ..SyncState::default()
        };
        Self { store, user_id, state }
    }

    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn status(&self) -> SyncStatus {
        self.state.status
    }

    fn target(&self) -> CoreResult<(CloudStoreRef, String)> {
        match (&self.store, &self.user_id) {
            (Some(store), Some(user_id)) => Ok((store.clone(), user_id.clone())),
            _ => Err(CoreError::SyncDisabled),
        }
    }

    fn finish<T>(&mut self, result: CoreResult<T>) -> CoreResult<T> {
        match &result {
            Ok(_) => {
                self.state.status = SyncStatus::Idle;
                self.state.last_sync = Some(Utc::now());
                self.state.last_error = None;
            }
            Err(e) => {
                log::error!("Cloud sync failed: {}", e);
                self.state.status = SyncStatus::Error;
                self.state.last_error = Some(e.to_string());
            }
        }
        result
    }

    /// Upload a snapshot of the current state
    pub async fn push(&mut self, mut snapshot: CloudSnapshot) -> CoreResult<()> {
        let (store, user_id) = self.target()?;
        self.state.status = SyncStatus::Saving;
        snapshot.last_updated = Some(Utc::now());
        let result = store.save(&user_id, &snapshot).await;
        if result.is_ok() {
            log::info!("Pushed snapshot for user {}", user_id);
        }
        self.finish(result)
    }

    /// Download the stored snapshot, if one exists
    pub async fn pull(&mut self) -> CoreResult<Option<CloudSnapshot>> {
        let (store, user_id) = self.target()?;
        self.state.status = SyncStatus::Loading;
        let result = store.load(&user_id).await;
        if let Ok(None) = result {
            log::info!("No cloud snapshot for user {}", user_id);
        }
        self.finish(result)
    }
}
