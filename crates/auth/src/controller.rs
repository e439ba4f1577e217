//! The auth flow controller: Unauthenticated → FlowStarted → Authenticated.

use remilk_types::{
    AuthErrorKind, GatewayError, RtmApi, TokenStore,
    traits::Result,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Authentication status of the gateway's single backend connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Unauthenticated,
    /// A frob has been issued and awaits human authorization.
    FlowStarted,
    Authenticated,
}

impl AuthStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::FlowStarted => "flow_started",
            Self::Authenticated => "authenticated",
        }
    }
}

/// The single in-flight authorization flow.
///
/// Valid until replaced by a newer flow or consumed by an exchange; there is
/// no local expiry, the backend enforces the frob's lifetime.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    /// Short-lived credential awaiting human authorization.
    pub frob: String,
    /// Unix seconds when the frob was issued.
    pub issued_at: u64,
    /// Signed authorization URL for the human to visit.
    pub auth_url: String,
}

/// Result of a `complete_flow` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// Already authenticated; the backend was not contacted.
    AlreadyAuthenticated,
    /// The exchange succeeded and the token was persisted.
    Authenticated { username: String },
}

/// Result of a `logout` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The confirmation flag was absent; nothing changed.
    NotConfirmed,
    LoggedOut,
}

/// Result of a startup `restore` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing was persisted.
    NoToken,
    /// The persisted token validated and is installed.
    Restored { username: String },
    /// The backend rejected the persisted token; the record was deleted.
    StaleTokenDiscarded,
    /// Validation could not be performed (transport failure); the record was
    /// kept but the gateway starts unauthenticated.
    Unverified,
}

struct AuthState {
    status: AuthStatus,
    flow: Option<AuthFlow>,
    username: Option<String>,
}

/// Owns auth status, the in-flight flow, and the token lifecycle.
///
/// All state sits behind one mutex that is never held across an await; the
/// backend exchange happens between a read phase and a commit phase.
pub struct AuthController {
    backend: Arc<dyn RtmApi>,
    store: Arc<dyn TokenStore>,
    state: Mutex<AuthState>,
}

impl AuthController {
    pub fn new(backend: Arc<dyn RtmApi>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            backend,
            store,
            state: Mutex::new(AuthState {
                status: AuthStatus::Unauthenticated,
                flow: None,
                username: None,
            }),
        }
    }

    /// Construct a controller with a pre-set status. Test seam; production
    /// code reaches `Authenticated` only through `complete_flow`/`restore`.
    pub fn with_status(
        backend: Arc<dyn RtmApi>,
        store: Arc<dyn TokenStore>,
        status: AuthStatus,
        username: Option<String>,
    ) -> Self {
        Self {
            backend,
            store,
            state: Mutex::new(AuthState {
                status,
                flow: None,
                username,
            }),
        }
    }

    // ── Read accessors (never mutate) ─────────────────────────────────────

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.state.lock().unwrap().status
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    /// Number of in-flight flows: 0 or 1 by construction.
    #[must_use]
    pub fn active_flow_count(&self) -> usize {
        usize::from(self.state.lock().unwrap().flow.is_some())
    }

    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.state.lock().unwrap().username.clone()
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Restore a persisted token at startup, validating it with the backend.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails; backend outcomes are
    /// reported through [`RestoreOutcome`].
    pub async fn restore(&self) -> Result<RestoreOutcome> {
        let Some(token) = self.store.load().await? else {
            return Ok(RestoreOutcome::NoToken);
        };

        match self.backend.check_token(&token.token).await {
            Ok(true) => {
                self.backend.set_auth_token(Some(token.token.clone()));
                let mut state = self.state.lock().unwrap();
                state.status = AuthStatus::Authenticated;
                state.username = Some(token.username.clone());
                tracing::info!(username = %token.username, "restored persisted session");
                Ok(RestoreOutcome::Restored {
                    username: token.username,
                })
            }
            Ok(false) => {
                tracing::warn!("persisted token rejected by backend, discarding");
                self.store.delete().await?;
                Ok(RestoreOutcome::StaleTokenDiscarded)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not validate persisted token");
                Ok(RestoreOutcome::Unverified)
            }
        }
    }

    /// Start (or replace) an authorization flow.
    ///
    /// Requests a fresh frob from the backend and discards any prior
    /// unexchanged flow. Does not downgrade an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the frob request fails.
    pub async fn start_flow(&self) -> Result<AuthFlow> {
        let frob = self.backend.get_frob().await?;
        let flow = AuthFlow {
            auth_url: self.backend.auth_url(&frob),
            frob,
            issued_at: unix_now(),
        };

        let mut state = self.state.lock().unwrap();
        if state.flow.is_some() {
            tracing::debug!("replacing in-flight auth flow");
        }
        state.flow = Some(flow.clone());
        if state.status != AuthStatus::Authenticated {
            state.status = AuthStatus::FlowStarted;
        }
        Ok(flow)
    }

    /// Exchange an authorized frob for a long-lived token.
    ///
    /// A blank `frob` falls back to the in-flight flow's frob. Calling this
    /// while already authenticated is a no-op success that does not contact
    /// the backend.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Auth`] with `NoFlow` when there is nothing to
    /// exchange, or `FrobRejected` when the backend refuses the frob;
    /// backend/transport failures pass through.
    pub async fn complete_flow(&self, frob: Option<&str>) -> Result<CompleteOutcome> {
        let frob = {
            let state = self.state.lock().unwrap();
            if state.status == AuthStatus::Authenticated {
                return Ok(CompleteOutcome::AlreadyAuthenticated);
            }
            match frob.map(str::trim).filter(|f| !f.is_empty()) {
                Some(f) => f.to_string(),
                None => state
                    .flow
                    .as_ref()
                    .map(|f| f.frob.clone())
                    .ok_or_else(|| {
                        GatewayError::auth(
                            AuthErrorKind::NoFlow,
                            "no authorization flow in progress; read the auth resource first",
                        )
                    })?,
            }
        };

        let token = match self.backend.get_token(&frob).await {
            Ok(token) => token,
            Err(GatewayError::Backend { code, msg })
                if code == remilk_types::error::backend_codes::INVALID_FROB =>
            {
                // A definitive rejection consumes the flow; the frob is spent.
                self.state.lock().unwrap().flow = None;
                return Err(GatewayError::auth(
                    AuthErrorKind::FrobRejected,
                    format!("backend rejected the credential: {msg}"),
                ));
            }
            Err(e) => return Err(e),
        };

        self.store.save(&token).await?;
        self.backend.set_auth_token(Some(token.token.clone()));

        let mut state = self.state.lock().unwrap();
        state.status = AuthStatus::Authenticated;
        state.flow = None;
        state.username = Some(token.username.clone());
        tracing::info!(username = %token.username, "authenticated");
        Ok(CompleteOutcome::Authenticated {
            username: token.username,
        })
    }

    /// Log out, clearing both the persisted token and in-memory state.
    ///
    /// Without `confirm` this is a no-op prompt, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to delete the record.
    pub async fn logout(&self, confirm: bool) -> Result<LogoutOutcome> {
        if !confirm {
            return Ok(LogoutOutcome::NotConfirmed);
        }

        self.store.delete().await?;
        self.backend.set_auth_token(None);

        let mut state = self.state.lock().unwrap();
        state.status = AuthStatus::Unauthenticated;
        state.flow = None;
        state.username = None;
        tracing::info!("logged out");
        Ok(LogoutOutcome::LoggedOut)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
