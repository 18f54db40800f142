/// Current viewer identity shared across feed components
///
/// The host initialises it once the auth session is known and invalidates
/// it on sign-out; components receive a clone instead of querying the auth
/// backend themselves.
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::error::{FeedError, Result};
use crate::models::ViewerId;

#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: ViewerId,
    /// Access token for authenticated backend calls
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewerContext {
    inner: Arc<RwLock<Option<Viewer>>>,
}

impl ViewerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(id: ViewerId, access_token: Option<String>) -> Self {
        let ctx = Self::new();
        ctx.sign_in(id, access_token);
        ctx
    }

    pub fn sign_in(&self, id: ViewerId, access_token: Option<String>) {
        info!(viewer_id = %id, "Viewer signed in");
        *self.inner.write() = Some(Viewer { id, access_token });
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.inner.write().take() {
            info!(viewer_id = %previous.id, "Viewer signed out");
        }
    }

    pub fn current(&self) -> Option<Viewer> {
        self.inner.read().clone()
    }

    pub fn viewer_id(&self) -> Option<ViewerId> {
        self.inner.read().as_ref().map(|v| v.id.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .as_ref()
            .and_then(|v| v.access_token.clone())
    }

    /// Viewer id or [`FeedError::Unauthenticated`]
    pub fn require(&self) -> Result<ViewerId> {
        self.viewer_id().ok_or(FeedError::Unauthenticated)
    }
}
