use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::brain::Generate;
use crate::error::{NavError, NavResult};
use crate::interpreter::interpret;
use crate::prompt::{SYSTEM_PROMPT, build_user_text};
use crate::screenshot::Screenshot;
use crate::types::Action;

/// One inbound navigation step, already decoded by the HTTP layer.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub goal: String,
    pub session_id: Option<String>,
    pub context: Option<String>,
    pub screenshot: Screenshot,
}

/// Validates the goal before asking the model.
pub fn validate_goal(goal: &str) -> NavResult<()> {
    if goal.trim().is_empty() {
        return Err(NavError::invalid("Goal must be a non-empty string."));
    }
    Ok(())
}

/// Asks the model for one next action per request. Holds no per-request state.
pub struct Navigator {
    brain: Arc<dyn Generate>,
}

impl Navigator {
    pub fn new(brain: Arc<dyn Generate>) -> Self {
        Self { brain }
    }

    pub async fn navigate(&self, request: NavigationRequest) -> NavResult<Action> {
        validate_goal(&request.goal)?;

        let request_id = format!("nav-{}", Uuid::new_v4());
        let span = tracing::info_span!("navigate", %request_id);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: NavigationRequest) -> NavResult<Action> {
        let screenshot = &request.screenshot;
        tracing::info!(
            mime = screenshot.mime_type(),
            bytes = screenshot.bytes.len(),
            goal_chars = request.goal.trim().chars().count(),
            has_session = request.session_id.is_some(),
            has_context = request.context.is_some(),
            "asking model for next step"
        );

        let user_text = build_user_text(
            &request.goal,
            request.session_id.as_deref(),
            request.context.as_deref(),
        );

        let reply = self
            .brain
            .generate(SYSTEM_PROMPT, &user_text, screenshot)
            .await
            .map_err(|e| {
                tracing::error!("model call failed: {:#}", e);
                NavError::Upstream(e)
            })?;

        tracing::debug!(reply_chars = reply.chars().count(), "model replied");

        let action = interpret(&reply).inspect_err(|e| {
            tracing::warn!("{}", e);
            tracing::debug!(raw = %reply, "rejected model reply");
        })?;

        if action.has_stray_text_input() {
            tracing::warn!(
                action = ?action.action,
                "model set text_input on a non-TYPE action"
            );
        }

        tracing::info!(action = ?action.action, status = ?action.status, "next step decided");
        Ok(action)
    }
}
