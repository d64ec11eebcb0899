use axum::{extract::State, http::StatusCode, Json};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::domain::session::{SessionSnapshot, SessionState};

pub struct SessionController {
    session: Arc<RwLock<SessionState>>,
}

impl SessionController {
    pub fn new(session: Arc<RwLock<SessionState>>) -> Self {
        Self { session }
    }

    /// GET /api/session - Counters and recent generations
    pub async fn get_session(State(controller): State<Arc<SessionController>>) -> Json<SessionSnapshot> {
        Json(controller.session.read().snapshot())
    }

    /// DELETE /api/session - Clear history and counters
    pub async fn reset_session(State(controller): State<Arc<SessionController>>) -> StatusCode {
        let mut session = controller.session.write();
        session.reset();
        tracing::info!(session_id = %session.id(), "Session reset");
        StatusCode::NO_CONTENT
    }
}
