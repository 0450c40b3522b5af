//! Login popup messages and window geometry.

use serde::Deserialize;

use crate::auth::ErrorPayload;

/// Default popup width when a caller does not pick one.
pub const DEFAULT_POPUP_WIDTH: u32 = 500;
/// Default popup height when a caller does not pick one.
pub const DEFAULT_POPUP_HEIGHT: u32 = 700;

/// Message posted by the popup to its opener.
///
/// Anything that does not parse into one of these shapes is ignored by the
/// popup flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PopupMessage {
    /// Informational: the origin the provider expects the app to live on.
    #[serde(rename_all = "camelCase")]
    ConfigInfo {
        /// Origin the backend was configured with.
        target_origin: String,
    },
    /// Terminal: the outcome of the authorization.
    AuthorizationResponse {
        /// Session payload on success.
        #[serde(default)]
        response: Option<serde_json::Value>,
        /// Error details on failure.
        #[serde(default)]
        error: Option<ErrorPayload>,
    },
}

impl PopupMessage {
    /// Parses message data, returning `None` for unrelated messages.
    #[must_use]
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        Self::deserialize(data).ok()
    }
}

/// Size and position of a popup window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupGeometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Distance from the left edge of the screen.
    pub left: i64,
    /// Distance from the top edge of the screen.
    pub top: i64,
}

impl PopupGeometry {
    /// Centers a popup of the given size on a screen of the given size.
    #[must_use]
    pub fn centered(width: u32, height: u32, screen: (u32, u32)) -> Self {
        let (screen_width, screen_height) = screen;
        Self {
            width,
            height,
            left: i64::from(screen_width) / 2 - i64::from(width) / 2,
            top: i64::from(screen_height) / 2 - i64::from(height) / 2,
        }
    }

    /// Window feature string for the host's `open` call.
    #[must_use]
    pub fn features(&self) -> String {
        format!(
            "menubar=no,location=no,resizable=no,scrollbars=no,status=no,width={},height={},top={},left={}",
            self.width, self.height, self.top, self.left
        )
    }
}
