//! Local listener for the OAuth redirect.
//!
//! The backend sends the browser to `http://localhost:<port>/authenticated`
//! with the access token in the query string. The handler forwards whatever
//! it finds to the app and bounces the browser to a static page so the token
//! does not linger in the address bar.

use std::io;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const CALLBACK_PATH: &str = "/authenticated";
pub const DONE_PATH: &str = "/authenticated/done";

/// How long the listener stays up after the redirect has landed.
const LINGER: Duration = Duration::from_secs(5);

const DONE_PAGE: &str = "<!doctype html>\n<html><head><title>MastoRadar</title></head>\
<body><p>Login received. You can close this tab and return to the terminal.</p></body></html>\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    access_token: Option<String>,
}

#[derive(Clone)]
struct CallbackState {
    tx: mpsc::Sender<CallbackEvent>,
    cancel: CancellationToken,
}

pub async fn bind(port: u16) -> io::Result<TcpListener> {
    TcpListener::bind(("127.0.0.1", port)).await
}

/// Serves the redirect route until `cancel` fires or the redirect has landed.
pub fn spawn(
    listener: TcpListener,
    tx: mpsc::Sender<CallbackEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let state = CallbackState {
        tx,
        cancel: cancel.clone(),
    };
    let app = Router::new()
        .route(CALLBACK_PATH, get(landing))
        .route(DONE_PATH, get(done))
        .with_state(state);

    tokio::spawn(async move {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "callback listener started");
        }
        let shutdown = async move { cancel.cancelled().await };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            warn!(error = %e, "callback listener failed");
        }
        debug!("callback listener stopped");
    })
}

async fn landing(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    debug!(has_token = params.access_token.is_some(), "redirect landed");
    let event = CallbackEvent {
        access_token: params.access_token,
    };
    if state.tx.send(event).await.is_err() {
        warn!("callback receiver dropped");
    }

    let cancel = state.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(LINGER).await;
        cancel.cancel();
    });

    Redirect::to(DONE_PATH)
}

async fn done() -> Html<&'static str> {
    Html(DONE_PAGE)
}

/// Pulls the access token out of a pasted redirect URL.
pub fn token_from_redirect_url(redirect: &str) -> Result<Option<String>, url::ParseError> {
    let url = url::Url::parse(redirect)?;
    Ok(url
        .query_pairs()
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned()))
}
