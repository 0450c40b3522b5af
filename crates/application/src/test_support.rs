//! Test doubles shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sessionkit_domain::{AuthError, ProfileInfo, ProviderInfo, ScopeSet, Session, scope_set};
use tokio::sync::{Notify, mpsc};

use crate::auth::{AuthConnector, CreateSessionOptions};
use crate::ports::{
    KeyValueStorage, MessageListener, PopupHandle, PopupId, StorageError, WindowHost,
    WindowMessage,
};

pub fn session(scopes: &[&str], expires_at: DateTime<Utc>) -> Session {
    Session {
        provider_info: ProviderInfo {
            access_token: format!("token-{}", scopes.join("-")),
            id_token: None,
            scopes: scope_set(scopes.iter().copied()),
            expires_at,
        },
        identity: None,
        profile: ProfileInfo::default(),
    }
}

// ---------------------------------------------------------------------------
// Window host
// ---------------------------------------------------------------------------

pub struct FakePopup {
    id: PopupId,
    closed: AtomicBool,
}

impl PopupHandle for FakePopup {
    fn id(&self) -> PopupId {
        self.id
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub struct FakeWindow {
    blocked: bool,
    next_id: AtomicU64,
    popups: Mutex<Vec<Arc<FakePopup>>>,
    features: Mutex<Vec<String>>,
    senders: Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<WindowMessage>>>>,
    installed: AtomicUsize,
}

impl FakeWindow {
    pub fn new() -> Self {
        Self {
            blocked: false,
            next_id: AtomicU64::new(1),
            popups: Mutex::new(Vec::new()),
            features: Mutex::new(Vec::new()),
            senders: Arc::new(Mutex::new(HashMap::new())),
            installed: AtomicUsize::new(0),
        }
    }

    pub fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::new()
        }
    }

    pub fn listeners_installed(&self) -> usize {
        self.installed.load(Ordering::SeqCst)
    }

    pub fn active_listeners(&self) -> usize {
        self.senders.lock().len()
    }

    pub fn opened_features(&self) -> Vec<String> {
        self.features.lock().clone()
    }

    /// Waits until a popup is open and a listener is installed for it.
    pub async fn wait_for_popup(&self) -> PopupId {
        for _ in 0..500 {
            let latest = self.popups.lock().last().map(|p| p.id);
            if let Some(id) = latest
                && self.active_listeners() > 0
            {
                return id;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("no popup was opened");
    }

    pub fn post(&self, source: Option<PopupId>, origin: &str, data: serde_json::Value) {
        for sender in self.senders.lock().values() {
            let _ = sender.send(WindowMessage {
                source,
                origin: origin.to_string(),
                data: data.clone(),
            });
        }
    }

    pub fn close_popup(&self, id: PopupId) {
        if let Some(popup) = self.popups.lock().iter().find(|p| p.id == id) {
            popup.close();
        }
    }

    pub fn is_closed(&self, id: PopupId) -> bool {
        self.popups
            .lock()
            .iter()
            .find(|p| p.id == id)
            .is_some_and(|p| p.is_closed())
    }
}

impl WindowHost for FakeWindow {
    fn origin(&self) -> String {
        "https://app.example.com".to_string()
    }

    fn screen_size(&self) -> (u32, u32) {
        (1920, 1080)
    }

    fn open_popup(&self, _url: &str, _name: &str, features: &str) -> Option<Arc<dyn PopupHandle>> {
        if self.blocked {
            return None;
        }
        let popup = Arc::new(FakePopup {
            id: PopupId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            closed: AtomicBool::new(false),
        });
        self.popups.lock().push(Arc::clone(&popup));
        self.features.lock().push(features.to_string());
        Some(popup)
    }

    fn add_message_listener(&self) -> MessageListener {
        let (tx, rx) = mpsc::unbounded_channel();
        let key = self.installed.fetch_add(1, Ordering::SeqCst) as u64;
        self.senders.lock().insert(key, tx);
        let senders = Arc::clone(&self.senders);
        MessageListener::new(rx, move || {
            senders.lock().remove(&key);
        })
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Scripted connector that counts calls.
///
/// `refresh_gate`, when set, holds every refresh call until notified so
/// tests can pile up concurrent callers.
pub struct FakeConnector {
    pub refresh_result: Mutex<Result<Option<Session>, AuthError>>,
    pub create_result: Mutex<Option<Session>>,
    pub refresh_calls: AtomicUsize,
    pub create_calls: Mutex<Vec<CreateSessionOptions>>,
    pub remove_calls: AtomicUsize,
    pub refresh_gate: Option<Arc<Notify>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self {
            refresh_result: Mutex::new(Err(AuthError::Network {
                message: "Auth refresh request failed, Unauthorized".to_string(),
                status: Some(401),
            })),
            create_result: Mutex::new(None),
            refresh_calls: AtomicUsize::new(0),
            create_calls: Mutex::new(Vec::new()),
            remove_calls: AtomicUsize::new(0),
            refresh_gate: None,
        }
    }

    pub fn refreshing_to(self, session: Session) -> Self {
        *self.refresh_result.lock() = Ok(Some(session));
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.refresh_gate = Some(gate);
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn created_scopes(&self) -> Vec<ScopeSet> {
        self.create_calls
            .lock()
            .iter()
            .map(|o| o.scopes.clone())
            .collect()
    }
}

#[async_trait]
impl AuthConnector for FakeConnector {
    async fn create_session(&self, options: CreateSessionOptions) -> Result<Session, AuthError> {
        let scopes: Vec<String> = options.scopes.iter().cloned().collect();
        self.create_calls.lock().push(options);
        let scripted = self.create_result.lock().clone();
        Ok(scripted.unwrap_or_else(|| {
            let refs: Vec<&str> = scopes.iter().map(String::as_str).collect();
            session(&refs, Utc::now() + chrono::Duration::hours(1))
        }))
    }

    async fn refresh_session(&self) -> Result<Option<Session>, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.refresh_gate {
            gate.notified().await;
        }
        self.refresh_result.lock().clone()
    }

    async fn remove_session(&self) -> Result<(), AuthError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeStorage {
    pub entries: Mutex<HashMap<String, String>>,
    pub fail_writes: AtomicBool,
}

impl FakeStorage {
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl KeyValueStorage for FakeStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("quota exceeded".to_string()));
        }
        self.put(key, value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
