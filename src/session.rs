//! Login lifecycle and the single access credential.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiError, BackendClient};
use crate::catalog::ViewSelector;
use crate::navigator::Navigator;
use crate::storage::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Anonymous,
    /// Waiting for the OAuth redirect to come back.
    Authenticating,
    Authenticated,
}

/// Snapshot of who is logged in. `status == Authenticated` iff `token` is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub status: SessionStatus,
}

impl Session {
    fn authenticated(token: String) -> Self {
        Self {
            token: Some(token),
            status: SessionStatus::Authenticated,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `@username` once the identity is resolved.
    pub fn handle(&self) -> Option<String> {
        self.user_name.as_ref().map(|name| format!("@{name}"))
    }
}

#[derive(Debug)]
pub enum SessionError {
    /// No usable access token: the redirect carried none, or it was blank.
    MissingCredential,
    AlreadyAuthenticated,
    Api(ApiError),
    Navigation(String),
    /// The local redirect listener could not be started.
    CallbackUnavailable(String),
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => {
                "Login failed: no access token was provided.".into()
            }
            Self::AlreadyAuthenticated => "Already logged in.".into(),
            Self::Api(e) => format!("Login failed: {}", e.user_message()),
            Self::Navigation(e) => format!("Could not open the browser: {e}"),
            Self::CallbackUnavailable(e) => {
                format!("Could not listen for the login redirect: {e}")
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for SessionError {}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

/// Shared handle; holding the lock for a whole operation keeps login
/// completion and logout from interleaving their credential writes.
pub type SharedSession = Arc<Mutex<SessionController>>;

pub struct SessionController {
    store: Arc<dyn TokenStore>,
    client: BackendClient,
    navigator: Arc<dyn Navigator>,
    session: Session,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn TokenStore>,
        client: BackendClient,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = match store.load() {
            Some(token) => Session::authenticated(token),
            None => Session::default(),
        };
        info!(status = ?session.status, "session restored");
        Self {
            store,
            client,
            navigator,
            session,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Starts the OAuth round-trip: fetches the authorization URL and opens it.
    pub async fn request_login(&mut self) -> Result<String, SessionError> {
        if self.session.is_authenticated() {
            return Err(SessionError::AlreadyAuthenticated);
        }
        self.session.status = SessionStatus::Authenticating;

        let url = match self.client.login_url().await {
            Ok(url) => url,
            Err(e) => {
                self.session.status = SessionStatus::Anonymous;
                return Err(e.into());
            }
        };
        if let Err(e) = self.navigator.open_external(&url) {
            self.session.status = SessionStatus::Anonymous;
            return Err(SessionError::Navigation(e.to_string()));
        }
        info!("opened authorization page");
        Ok(url)
    }

    /// Drops a pending round-trip, e.g. when the user gives up waiting.
    pub fn cancel_login(&mut self) {
        if self.session.status == SessionStatus::Authenticating {
            self.session.status = SessionStatus::Anonymous;
        }
    }

    /// Persists `token`, marks the session authenticated and resolves the
    /// identity. Returns the view to land on. A blank token is rejected
    /// without touching the store or the session.
    pub async fn complete_login(&mut self, token: &str) -> Result<ViewSelector, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            warn!("refusing to store an empty access token");
            return Err(SessionError::MissingCredential);
        }
        self.store.save(token);
        self.session = Session::authenticated(token.to_string());
        info!("session authenticated");
        self.resolve_identity().await;
        Ok(ViewSelector::default_authenticated())
    }

    /// Entry point for the redirect-landing route.
    pub async fn handle_callback(
        &mut self,
        query_token: Option<&str>,
    ) -> Result<ViewSelector, SessionError> {
        if let Some(stored) = self.store.load() {
            debug!("credential already stored, ignoring callback parameters");
            if self.session.token() != Some(stored.as_str()) {
                self.session = Session::authenticated(stored);
                self.resolve_identity().await;
            }
            return Ok(ViewSelector::default_authenticated());
        }

        match query_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => self.complete_login(token).await,
            None => {
                self.session = Session::default();
                warn!("callback reached without an access token");
                Err(SessionError::MissingCredential)
            }
        }
    }

    /// Resolves the user name for a session restored from storage.
    pub async fn refresh_identity(&mut self) {
        if self.session.is_authenticated() && self.session.user_name.is_none() {
            self.resolve_identity().await;
        }
    }

    async fn resolve_identity(&mut self) {
        let Some(token) = self.session.token.clone() else {
            return;
        };
        match self.client.fetch_user(&token).await {
            Ok(user) => {
                debug!(user_id = ?user.user_id, username = ?user.username, "identity resolved");
                self.session.user_id = user.user_id;
                self.session.user_name = user.username;
                self.session.display_name = user.display_name;
            }
            Err(e) => warn!(error = %e, "identity lookup failed, user name left unresolved"),
        }
    }

    /// Ends the session. The backend call is best-effort; local state is
    /// always cleared. Returns the view to land on.
    pub async fn logout(&mut self) -> ViewSelector {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "backend logout failed");
        }
        self.store.clear();
        self.session = Session::default();
        info!("session cleared");
        ViewSelector::default_anonymous()
    }
}
