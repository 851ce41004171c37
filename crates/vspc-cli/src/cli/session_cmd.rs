use super::app::{AppContext, Output};
use super::*;
use vspc_core::model::{Session, TokenState, now_epoch_millis};

/// What `session` reports. Tokens themselves are never printed.
#[derive(Debug, Serialize)]
pub(super) struct SessionInfo {
    pub(super) base_url: String,
    pub(super) expires_at_epoch_ms: i64,
    pub(super) expired: bool,
}

impl SessionInfo {
    pub(super) fn from_session(session: &Session, now_ms: i64) -> Self {
        Self {
            base_url: session.base_url.clone(),
            expires_at_epoch_ms: session.expires_at_epoch_ms,
            expired: session.token_state_at(now_ms) == TokenState::Expired,
        }
    }
}

pub(super) async fn handle_login(
    args: LoginArgs,
    context: &AppContext,
    output: Output,
) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let client = context.portal_client(&config)?;
    let session = client
        .tokens()
        .login(&args.url, &args.username, &args.password)
        .await
        .context("login")?;
    let info = SessionInfo::from_session(&session, now_epoch_millis());
    output.emit(&info, |info| format!("Logged in to {}\n", info.base_url))
}

pub(super) fn handle_logout(context: &AppContext, output: Output) -> anyhow::Result<()> {
    let config = context.load_config()?;
    context
        .portal_client(&config)?
        .tokens()
        .logout()
        .context("logout")?;
    output.emit(&serde_json::json!({ "logged_out": true }), |_| {
        "Logged out\n".to_string()
    })
}

pub(super) fn handle_session(context: &AppContext, output: Output) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let session = context
        .session_store(&config)?
        .load()
        .context("load session")?;
    let Some(session) = session else {
        return output.emit(&serde_json::Value::Null, |_| "Not logged in\n".to_string());
    };
    let info = SessionInfo::from_session(&session, now_epoch_millis());
    output.emit(&info, |info| render::render_session(info))
}
