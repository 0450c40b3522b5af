//! Helpers shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sessionkit_application::ports::ManualClock;
use sessionkit_domain::{AuthProviderInfo, ProviderConfig};
use serde_json::{Value, json};

use crate::adapters::UrlPatternDiscovery;
use crate::auth::ConnectorOptions;
use crate::window::{ChannelWindowHost, OpenedPopup};

pub const APP_ORIGIN: &str = "https://app.example.com";

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Connector options against `base`, with an in-process window.
pub fn options(base: &str) -> (ConnectorOptions, Arc<ChannelWindowHost>) {
    let window = Arc::new(ChannelWindowHost::new(APP_ORIGIN, (1920, 1080)));
    let options = ConnectorOptions {
        config: ProviderConfig::for_provider(AuthProviderInfo::new("github", "GitHub")),
        discovery: Arc::new(UrlPatternDiscovery::compile(format!("{base}/api/{{{{pluginId}}}}")).unwrap()),
        window: window.clone(),
        clock: Arc::new(ManualClock::new(fixed_now())),
    };
    (options, window)
}

pub fn session_payload(scope: &str) -> Value {
    json!({
        "providerInfo": {
            "accessToken": "gho_token",
            "idToken": "id.jwt",
            "scope": scope,
            "expiresInSeconds": 3600
        },
        "profile": { "email": "ada@example.com", "displayName": "Ada" },
        "identity": { "token": "platform-token", "expiresInSeconds": 1800 }
    })
}

/// Waits for the next popup and answers it with `payload`.
pub async fn answer_popup(window: &ChannelWindowHost, payload: Value) -> OpenedPopup {
    let opened = window.next_opened().await.unwrap();
    while window.listener_count() == 0 {
        tokio::task::yield_now().await;
    }
    let origin = url::Url::parse(&opened.url).unwrap().origin().ascii_serialization();
    window.post_message(
        Some(opened.id),
        &origin,
        json!({ "type": "authorization_response", "response": payload }),
    );
    opened
}

pub fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
