//! Interactive login popup flow.
//!
//! Opens a centered consent window and waits for one of three things to
//! happen first: a terminal `authorization_response` message from the popup,
//! the liveness poll noticing the popup was closed, or the caller's abort
//! future completing. The message listener is a drop guard, so it is removed
//! exactly once on every exit path.

use std::future::Future;
use std::time::Duration;

use sessionkit_domain::popup::{DEFAULT_POPUP_HEIGHT, DEFAULT_POPUP_WIDTH};
use sessionkit_domain::{AuthError, PopupGeometry, PopupMessage};
use tokio::time::MissedTickBehavior;

use crate::ports::WindowHost;

/// How often the popup is checked for having been closed.
pub const POPUP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Options for [`show_login_popup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPopupOptions {
    /// URL to open in the popup.
    pub url: String,
    /// Window name.
    pub name: String,
    /// Only messages posted from this origin are accepted.
    pub origin: String,
    /// Popup width, defaults to 500.
    pub width: Option<u32>,
    /// Popup height, defaults to 700.
    pub height: Option<u32>,
}

/// Shows a login popup and resolves with the popup's response payload.
///
/// # Errors
///
/// - [`AuthError::PopupRejected`] if the host refused to open the popup.
/// - [`AuthError::PopupClosed`] if the popup closed before responding.
/// - [`AuthError::Provider`] if the popup reported an error.
pub async fn show_login_popup(
    window: &dyn WindowHost,
    options: &LoginPopupOptions,
) -> Result<serde_json::Value, AuthError> {
    show_login_popup_until(window, options, std::future::pending()).await
}

/// Like [`show_login_popup`], but gives up with [`AuthError::Rejected`] and
/// closes the popup once `abort` completes.
///
/// # Errors
///
/// See [`show_login_popup`].
pub async fn show_login_popup_until<F>(
    window: &dyn WindowHost,
    options: &LoginPopupOptions,
    abort: F,
) -> Result<serde_json::Value, AuthError>
where
    F: Future<Output = ()> + Send,
{
    let geometry = PopupGeometry::centered(
        options.width.unwrap_or(DEFAULT_POPUP_WIDTH),
        options.height.unwrap_or(DEFAULT_POPUP_HEIGHT),
        window.screen_size(),
    );

    let Some(popup) = window
        .open_popup(&options.url, &options.name, &geometry.features())
        .filter(|popup| !popup.is_closed())
    else {
        return Err(AuthError::PopupRejected {
            message: "Failed to open auth popup.".to_string(),
        });
    };
    tracing::debug!(name = %options.name, "login popup opened");

    let mut listener = window.add_message_listener();
    let mut liveness = tokio::time::interval(POPUP_POLL_INTERVAL);
    liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut target_origin: Option<String> = None;
    let mut listening = true;
    tokio::pin!(abort);

    loop {
        tokio::select! {
            biased;

            () = &mut abort => {
                popup.close();
                return Err(AuthError::Rejected);
            }

            message = listener.recv(), if listening => {
                let Some(message) = message else {
                    listening = false;
                    continue;
                };
                if message.source != Some(popup.id()) || message.origin != options.origin {
                    continue;
                }
                match PopupMessage::parse(&message.data) {
                    Some(PopupMessage::ConfigInfo { target_origin: origin }) => {
                        target_origin = Some(origin);
                    }
                    Some(PopupMessage::AuthorizationResponse { error: Some(error), .. }) => {
                        return Err(error.into());
                    }
                    Some(PopupMessage::AuthorizationResponse { response, .. }) => {
                        return Ok(response.unwrap_or(serde_json::Value::Null));
                    }
                    None => {}
                }
            }

            _ = liveness.tick() => {
                if popup.is_closed() {
                    return Err(closed_error(target_origin, &window.origin()));
                }
            }
        }
    }
}

fn closed_error(target_origin: Option<String>, page_origin: &str) -> AuthError {
    match target_origin.filter(|origin| !origin.is_empty() && origin != page_origin) {
        Some(expected) => AuthError::PopupClosed {
            message: format!("Login failed, Incorrect app origin, expected {expected}"),
            expected_origin: Some(expected),
        },
        None => AuthError::PopupClosed {
            message: "Login failed, popup was closed".to_string(),
            expected_origin: None,
        },
    }
}
