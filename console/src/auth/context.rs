//! Process-wide authentication state.
//!
//! A reducer-style state machine owns the signed-in user. Every transition
//! funnels through one apply point, and the operations around it talk to the
//! backend, the session file, and the transport credential slot in a fixed
//! order: credential first, persistence second, state last.

use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

use crate::api::user::UserService;
use crate::auth::models::{
    AuthUser, LoginRequest, LoginResponse, RegistrationRequest, RegistrationResponse,
};
use crate::errors::{ServiceError, ServiceResult, validate_dto};
use crate::http::HttpClient;
use crate::routes::{self, Navigator};
use crate::session::{SessionRecord, SessionStore};
use crate::utils::jwt::TokenInspector;

/// Authentication state as guards and menus read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub is_initialized: bool,
    pub is_authenticated: bool,
    pub user: Option<AuthUser>,
}

impl AuthState {
    fn new() -> Self {
        AuthState {
            is_initialized: false,
            is_authenticated: false,
            user: None,
        }
    }
}

/// The only mutator of `AuthState`, applied under the state lock.
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// Outcome of the one-time session restore.
    Initial { user: Option<AuthUser> },
    Login { user: AuthUser },
    Register { user: AuthUser },
    Logout,
}

/// Pure transition function. `is_authenticated` tracks `user` presence in
/// every arm, so the two can never disagree.
fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::Initial { user } => AuthState {
            is_initialized: true,
            is_authenticated: user.is_some(),
            user,
        },
        AuthAction::Login { user } | AuthAction::Register { user } => AuthState {
            is_initialized: state.is_initialized,
            is_authenticated: true,
            user: Some(user),
        },
        AuthAction::Logout => AuthState {
            is_initialized: state.is_initialized,
            is_authenticated: false,
            user: None,
        },
    }
}

/// Owns authentication for the whole process.
///
/// Constructed once at startup with its collaborators injected; everything
/// that needs auth state reads a snapshot rather than reaching into a global.
pub struct AuthContext {
    http: Arc<HttpClient>,
    store: SessionStore,
    inspector: TokenInspector,
    navigator: Arc<dyn Navigator>,
    state: RwLock<AuthState>,
    init_latch: OnceCell<()>,
}

impl AuthContext {
    pub fn new(http: Arc<HttpClient>, store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        AuthContext {
            http,
            store,
            inspector: TokenInspector::new(),
            navigator,
            state: RwLock::new(AuthState::new()),
            init_latch: OnceCell::new(),
        }
    }

    /// Current state, cloned. Guards work off this snapshot.
    pub async fn snapshot(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Attempts to restore a persisted session, exactly once per process.
    /// Concurrent and repeated calls wait for the first run and then return
    /// without doing anything.
    pub async fn initialize(&self) {
        self.init_latch
            .get_or_init(|| async {
                self.run_initialize().await;
            })
            .await;
    }

    async fn run_initialize(&self) {
        match self.restore_session().await {
            Ok(Some(user)) => {
                let home = routes::home_path(user.role);
                self.apply(AuthAction::Initial { user: Some(user) }).await;
                self.navigator.navigate(home);
            }
            Ok(None) => {
                self.apply(AuthAction::Initial { user: None }).await;
            }
            Err(e) => {
                tracing::warn!("session restore failed: {}", e);
                if e.is_credential_failure() || matches!(e, ServiceError::NotFound { .. }) {
                    self.discard_session_file();
                }
                self.http.set_bearer(None).await;
                self.apply(AuthAction::Initial { user: None }).await;
            }
        }
    }

    /// Loads the stored record, drops it when it is unusable, and fetches
    /// the canonical user record with the restored credential.
    async fn restore_session(&self) -> ServiceResult<Option<AuthUser>> {
        let record = match self.store.load() {
            Ok(record) => record,
            Err(e) => {
                // A file that cannot be read would fail every restart.
                tracing::warn!("discarding unreadable session file: {}", e);
                self.discard_session_file();
                return Ok(None);
            }
        };
        let Some(record) = record else {
            return Ok(None);
        };

        // Locally stale tokens are dropped without a network round trip.
        match self.inspector.peek(&record.access_token) {
            Ok(claims) if claims.is_expired() => {
                tracing::info!("stored token has expired, clearing session");
                self.discard_session_file();
                return Ok(None);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("stored token is not decodable: {}", e);
                self.discard_session_file();
                return Ok(None);
            }
        }

        self.http.set_bearer(Some(record.access_token.clone())).await;

        let user = UserService::new(&self.http).get_user(&record.id).await?;
        Ok(Some(AuthUser::from(&user)))
    }

    /// Exchanges credentials for a session.
    ///
    /// # Errors
    /// Returns `ServiceError::Authentication` for rejected credentials and
    /// `ServiceError::Validation` for input that never left the console.
    /// Failures leave the current state untouched so callers can branch on
    /// the result instead of re-reading shared state.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthUser> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        validate_dto(&request)?;

        let response: LoginResponse = self.http.post("/player", &request).await?;
        let user = self.install_session(response).await;
        tracing::info!("login succeeded for {} ({})", user.id, user.role);
        self.apply(AuthAction::Login { user: user.clone() }).await;
        Ok(user)
    }

    /// Registers a player account. When the backend includes a credential
    /// set in its response the new player is signed in right away; `None`
    /// means the account exists but a separate sign-in is required.
    pub async fn register(&self, request: RegistrationRequest) -> ServiceResult<Option<AuthUser>> {
        validate_dto(&request)?;

        let response: RegistrationResponse = self.http.post("/player", &request).await?;
        match response.into_login() {
            Some(login) => {
                let user = self.install_session(login).await;
                tracing::info!("registration signed {} in directly", user.id);
                self.apply(AuthAction::Register { user: user.clone() }).await;
                Ok(Some(user))
            }
            None => {
                tracing::info!("registration accepted, sign-in required");
                Ok(None)
            }
        }
    }

    /// Clears the session everywhere. Safe to call when already signed out.
    pub async fn logout(&self) {
        self.discard_session_file();
        self.http.set_bearer(None).await;
        self.apply(AuthAction::Logout).await;
    }

    async fn install_session(&self, response: LoginResponse) -> AuthUser {
        let user = AuthUser::from(&response);
        let record = SessionRecord::from(response);
        self.http.set_bearer(Some(record.access_token.clone())).await;
        if let Err(e) = self.store.save(&record) {
            // The login itself stands; only restart convenience is lost.
            tracing::warn!("could not persist session: {}", e);
        }
        user
    }

    fn discard_session_file(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("could not remove session file: {}", e);
        }
    }

    async fn apply(&self, action: AuthAction) {
        let mut state = self.state.write().await;
        *state = reduce(&state, action);
    }
}
