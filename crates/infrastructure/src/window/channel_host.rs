//! In-process window host.
//!
//! Stands in for a browser window when the coordinator is embedded in a
//! process that renders consent pages some other way, for example a desktop
//! shell or a test harness. Opened popups are announced on a channel; the
//! embedder posts the popup's messages back and closes it when done.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use sessionkit_application::ports::{
    MessageListener, PopupHandle, PopupId, WindowHost, WindowMessage,
};
use tokio::sync::mpsc;

/// A popup the coordinator asked to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedPopup {
    /// Popup identity, used as the message source.
    pub id: PopupId,
    /// URL the popup should load.
    pub url: String,
    /// Window name.
    pub name: String,
    /// Window feature string with the popup geometry.
    pub features: String,
}

struct ChannelPopup {
    id: PopupId,
    closed: AtomicBool,
}

impl PopupHandle for ChannelPopup {
    fn id(&self) -> PopupId {
        self.id
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!(popup = self.id.0, "popup closed");
        }
    }
}

type ListenerMap = HashMap<u64, mpsc::UnboundedSender<WindowMessage>>;

/// Window host backed by in-process channels.
pub struct ChannelWindowHost {
    origin: String,
    screen: (u32, u32),
    blocked: AtomicBool,
    next_popup: AtomicU64,
    next_listener: AtomicU64,
    popups: Mutex<HashMap<PopupId, Arc<ChannelPopup>>>,
    listeners: Arc<Mutex<ListenerMap>>,
    opened_tx: mpsc::UnboundedSender<OpenedPopup>,
    opened_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<OpenedPopup>>,
}

impl ChannelWindowHost {
    /// Creates a host for a page served from `origin`.
    pub fn new(origin: impl Into<String>, screen: (u32, u32)) -> Self {
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        Self {
            origin: origin.into(),
            screen,
            blocked: AtomicBool::new(false),
            next_popup: AtomicU64::new(1),
            next_listener: AtomicU64::new(1),
            popups: Mutex::new(HashMap::new()),
            listeners: Arc::new(Mutex::new(HashMap::new())),
            opened_tx,
            opened_rx: tokio::sync::Mutex::new(opened_rx),
        }
    }

    /// Makes subsequent `open_popup` calls fail, like a popup blocker.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Waits for the next popup the coordinator opens.
    pub async fn next_opened(&self) -> Option<OpenedPopup> {
        self.opened_rx.lock().await.recv().await
    }

    /// Delivers a message to every installed listener.
    pub fn post_message(&self, source: Option<PopupId>, origin: &str, data: serde_json::Value) {
        let listeners = self.listeners.lock();
        tracing::debug!(listeners = listeners.len(), origin, "posting window message");
        for sender in listeners.values() {
            let _ = sender.send(WindowMessage {
                source,
                origin: origin.to_string(),
                data: data.clone(),
            });
        }
    }

    /// Closes a popup as if the user dismissed it.
    pub fn close_popup(&self, id: PopupId) {
        if let Some(popup) = self.popups.lock().remove(&id) {
            popup.close();
        }
    }

    /// Returns true if the popup was closed or never existed.
    #[must_use]
    pub fn is_closed(&self, id: PopupId) -> bool {
        self.popups.lock().get(&id).is_none_or(|popup| popup.is_closed())
    }

    /// Number of message listeners currently installed.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl WindowHost for ChannelWindowHost {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn open_popup(&self, url: &str, name: &str, features: &str) -> Option<Arc<dyn PopupHandle>> {
        if self.blocked.load(Ordering::SeqCst) {
            tracing::debug!(name, "popup blocked");
            return None;
        }

        let popup = Arc::new(ChannelPopup {
            id: PopupId(self.next_popup.fetch_add(1, Ordering::SeqCst)),
            closed: AtomicBool::new(false),
        });
        {
            let mut popups = self.popups.lock();
            popups.retain(|_, open| !open.is_closed());
            popups.insert(popup.id, Arc::clone(&popup));
        }
        let _ = self.opened_tx.send(OpenedPopup {
            id: popup.id,
            url: url.to_string(),
            name: name.to_string(),
            features: features.to_string(),
        });
        Some(popup)
    }

    fn add_message_listener(&self) -> MessageListener {
        let (tx, rx) = mpsc::unbounded_channel();
        let key = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().insert(key, tx);

        let listeners = Arc::clone(&self.listeners);
        MessageListener::new(rx, move || {
            listeners.lock().remove(&key);
        })
    }
}

impl std::fmt::Debug for ChannelWindowHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelWindowHost")
            .field("origin", &self.origin)
            .field("screen", &self.screen)
            .field("popups", &self.popups.lock().len())
            .finish_non_exhaustive()
    }
}
