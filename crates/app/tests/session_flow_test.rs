//! End-to-end session flows against an in-process auth backend.
//!
//! The backend is an axum server on an ephemeral port; the user is played by
//! the test, answering consent popups through the channel window host.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use sessionkit_application::ports::SystemClock;
use sessionkit_application::{AuthRequestOptions, OAuthRequestManager};
use sessionkit_domain::{AuthProviderInfo, ProviderConfig, SessionState};
use sessionkit_infrastructure::{
    ChannelWindowHost, ClientEnvironment, FileStorage, MediatedClient, UrlPatternDiscovery,
    direct_client, mediated_client,
};
use tempfile::TempDir;

#[derive(Default)]
struct Backend {
    refreshes: AtomicUsize,
    logouts: AtomicUsize,
}

async fn start_backend(backend: Arc<Backend>) -> String {
    let refresh_counter = Arc::clone(&backend);
    let logout_counter = Arc::clone(&backend);
    let router = Router::new()
        .route(
            "/api/auth/github/refresh",
            get(move || {
                refresh_counter.refreshes.fetch_add(1, Ordering::SeqCst);
                async { StatusCode::UNAUTHORIZED }
            }),
        )
        .route(
            "/api/auth/github/logout",
            post(move || {
                logout_counter.logouts.fetch_add(1, Ordering::SeqCst);
                async { StatusCode::OK }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn payload(scope: &str) -> Value {
    json!({
        "providerInfo": {
            "accessToken": format!("token for {scope}"),
            "scope": scope,
            "expiresInSeconds": 3600
        },
        "profile": { "email": "ada@example.com" }
    })
}

struct Harness {
    base: String,
    window: Arc<ChannelWindowHost>,
    env: ClientEnvironment,
}

impl Harness {
    fn new(base: &str, state: &TempDir) -> Self {
        let window = Arc::new(ChannelWindowHost::new("https://app.example.com", (1920, 1080)));
        let env = ClientEnvironment {
            discovery: Arc::new(
                UrlPatternDiscovery::compile(format!("{base}/api/{{{{pluginId}}}}")).unwrap(),
            ),
            window: window.clone(),
            storage: Arc::new(FileStorage::new(state.path())),
            clock: Arc::new(SystemClock),
        };
        Self {
            base: base.to_string(),
            window,
            env,
        }
    }

    fn config() -> ProviderConfig {
        ProviderConfig::for_provider(AuthProviderInfo::new("github", "GitHub"))
            .with_default_scopes(["read:user"])
    }

    fn mediated(&self, requests: &OAuthRequestManager) -> MediatedClient {
        mediated_client(Self::config(), &self.env, requests).unwrap()
    }

    /// Waits for the next popup and approves whatever scopes it asks for.
    async fn approve_popup(&self) -> String {
        let opened = self.window.next_opened().await.unwrap();
        while self.window.listener_count() == 0 {
            tokio::task::yield_now().await;
        }
        let scope = opened
            .url
            .split(['?', '&'])
            .find_map(|pair| pair.strip_prefix("scope="))
            .unwrap()
            .replace('+', " ")
            .replace("%3A", ":");
        self.window.post_message(
            Some(opened.id),
            &self.base,
            json!({ "type": "authorization_response", "response": payload(&scope) }),
        );
        scope
    }
}

/// Triggers the first pending login as soon as one is published.
async fn trigger_next(requests: &OAuthRequestManager) -> tokio::task::JoinHandle<()> {
    let pending = loop {
        if let Some(pending) = requests.pending_requests().into_iter().next() {
            break pending;
        }
        tokio::task::yield_now().await;
    };
    tokio::spawn(async move { pending.trigger().await.unwrap() })
}

#[tokio::test]
async fn test_sign_in_persist_reuse_and_sign_out() {
    let backend = Arc::new(Backend::default());
    let base = start_backend(Arc::clone(&backend)).await;
    let state = TempDir::new().unwrap();
    let harness = Harness::new(&base, &state);
    let requests = OAuthRequestManager::new();
    let client = harness.mediated(&requests);

    let token = {
        let client = &client;
        let token = async move {
            client
                .get_access_token("repo", AuthRequestOptions::default())
                .await
        };
        let user = async {
            let trigger = trigger_next(&requests).await;
            let scope = harness.approve_popup().await;
            trigger.await.unwrap();
            scope
        };
        let (token, scope) = tokio::join!(token, user);
        assert_eq!(scope, "read:user repo");
        token.unwrap()
    };
    assert_eq!(token.as_deref(), Some("token for read:user repo"));
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
    assert!(state.path().join("github-session.json").exists());
    assert_eq!(*client.session_state().borrow(), SessionState::SignedIn);

    // A second client over the same storage reuses the persisted session.
    let restarted = harness.mediated(&OAuthRequestManager::new());
    let reused = restarted
        .get_access_token("repo", AuthRequestOptions::optional())
        .await
        .unwrap();
    assert_eq!(reused, token);
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);

    restarted.sign_out().await.unwrap();
    assert_eq!(backend.logouts.load(Ordering::SeqCst), 1);
    assert!(!state.path().join("github-session.json").exists());
    assert_eq!(*restarted.session_state().borrow(), SessionState::SignedOut);
}

#[tokio::test]
async fn test_concurrent_callers_get_one_prompt_for_the_union() {
    let backend = Arc::new(Backend::default());
    let base = start_backend(Arc::clone(&backend)).await;
    let state = TempDir::new().unwrap();
    let harness = Harness::new(&base, &state);
    let requests = OAuthRequestManager::new();
    let client = harness.mediated(&requests);

    let repo = client.get_access_token("repo", AuthRequestOptions::default());
    let gist = client.get_access_token("gist", AuthRequestOptions::default());
    let user = async {
        // Wait until both demands are merged before showing the prompt.
        let pending = loop {
            let pending = requests.pending_requests();
            if pending.first().is_some_and(|p| p.scopes().len() == 3) {
                break pending;
            }
            tokio::task::yield_now().await;
        };
        let (result, scope) = tokio::join!(pending[0].trigger(), harness.approve_popup());
        result.unwrap();
        scope
    };

    let (repo, gist, scope) = tokio::join!(repo, gist, user);
    assert_eq!(scope, "gist read:user repo");
    assert_eq!(repo.unwrap(), gist.unwrap());
    assert!(requests.pending_requests().is_empty());
}

#[tokio::test]
async fn test_rejected_prompt_fails_waiting_callers() {
    let backend = Arc::new(Backend::default());
    let base = start_backend(Arc::clone(&backend)).await;
    let state = TempDir::new().unwrap();
    let harness = Harness::new(&base, &state);
    let requests = OAuthRequestManager::new();
    let client = harness.mediated(&requests);

    let token = client.get_access_token("repo", AuthRequestOptions::default());
    let user = async {
        loop {
            if let Some(pending) = requests.pending_requests().first() {
                pending.reject();
                break;
            }
            tokio::task::yield_now().await;
        }
    };

    let (token, ()) = tokio::join!(token, user);
    assert_eq!(token.unwrap_err().name(), "RejectedError");
    assert!(!state.path().join("github-session.json").exists());
}

#[tokio::test]
async fn test_direct_client_prompts_without_refresh() {
    let backend = Arc::new(Backend::default());
    let base = start_backend(Arc::clone(&backend)).await;
    let state = TempDir::new().unwrap();
    let harness = Harness::new(&base, &state);
    let client = direct_client(Harness::config(), &harness.env).unwrap();

    assert_eq!(
        client
            .get_access_token("repo", AuthRequestOptions::optional())
            .await
            .unwrap(),
        None
    );

    let (token, scope) = tokio::join!(
        client.get_access_token("repo", AuthRequestOptions::default()),
        harness.approve_popup()
    );
    assert_eq!(scope, "read:user repo");
    assert_eq!(token.unwrap().as_deref(), Some("token for read:user repo"));
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 0);
}
