//! Window host port
//!
//! Abstracts the browser window the coordinator lives in: opening a popup,
//! checking whether it is still open, and receiving cross-window messages.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

/// Identifies a popup opened by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(pub u64);

/// A popup window opened by the host.
pub trait PopupHandle: Send + Sync {
    /// Identity used to match message sources.
    fn id(&self) -> PopupId;

    /// Returns true once the window has been closed, by the user or otherwise.
    fn is_closed(&self) -> bool;

    /// Closes the window.
    fn close(&self);
}

/// A message received from another window.
#[derive(Debug, Clone)]
pub struct WindowMessage {
    /// Popup that posted the message, if it came from one.
    pub source: Option<PopupId>,
    /// Origin of the posting window.
    pub origin: String,
    /// Message payload.
    pub data: serde_json::Value,
}

/// An installed message listener.
///
/// Dropping the listener uninstalls it.
pub struct MessageListener {
    receiver: mpsc::UnboundedReceiver<WindowMessage>,
    on_remove: Option<Box<dyn FnOnce() + Send>>,
}

impl MessageListener {
    /// Wraps a receiver; `on_remove` runs exactly once when the listener is dropped.
    pub fn new(
        receiver: mpsc::UnboundedReceiver<WindowMessage>,
        on_remove: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            on_remove: Some(Box::new(on_remove)),
        }
    }

    /// Waits for the next message; `None` once the host stops delivering.
    pub async fn recv(&mut self) -> Option<WindowMessage> {
        self.receiver.recv().await
    }
}

impl Drop for MessageListener {
    fn drop(&mut self) {
        if let Some(on_remove) = self.on_remove.take() {
            on_remove();
        }
    }
}

impl fmt::Debug for MessageListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageListener")
            .field("installed", &self.on_remove.is_some())
            .finish()
    }
}

/// Port for the window that owns the session coordinator.
pub trait WindowHost: Send + Sync {
    /// Origin of the current page, for example `https://app.example.com`.
    fn origin(&self) -> String;

    /// Screen size in pixels, used to center popups.
    fn screen_size(&self) -> (u32, u32);

    /// Opens a popup. Returns `None` if the host blocked it.
    fn open_popup(&self, url: &str, name: &str, features: &str) -> Option<Arc<dyn PopupHandle>>;

    /// Installs a listener receiving every message posted to this window.
    fn add_message_listener(&self) -> MessageListener;
}
