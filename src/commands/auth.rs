//! Login, logout and whoami.

use crate::api::Mode;
use crate::commands::{connect, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::session::{self, Session};
use crate::{Config, Result};
use chrono::Utc;
use tracing::debug;

/// Verifies `username` and `password` against the administrator accounts in the store and starts
/// a session. An existing session is replaced.
///
/// # Errors
/// - A validation error if either value is empty.
/// - An authorization error if no account matches. The message does not say which value was wrong.
pub async fn login(
    config: &Config,
    mode: Mode,
    username: &str,
    password: &str,
) -> Result<Out<Session>> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(public_error(
            ErrorType::Validation,
            "a username and a password are required",
        ));
    }
    let mut remote = connect(config, mode).await?;
    let user = remote
        .verify_user(username, password)
        .await
        .pub_result(ErrorType::Remote)?
        .ok_or_else(|| public_error(ErrorType::Authorization, "invalid username or password"))?;

    let session = Session::new(&user, Utc::now());
    session::start(config, &session)
        .await
        .pub_result(ErrorType::Local)?;
    debug!("Started a session for {}", user.username);
    Ok(Out::new(
        format!("Logged in as {} ({})", user.username, user.role),
        session,
    ))
}

/// Ends the current session, if any.
pub async fn logout(config: &Config) -> Result<Out<()>> {
    let ended = session::end(config).await.pub_result(ErrorType::Local)?;
    Ok(if ended {
        "Logged out".into()
    } else {
        "Nobody is logged in".into()
    })
}

/// Reports the logged-in user. Like every other command this counts as activity, so an idle
/// session is logged out here rather than reported.
pub async fn whoami(config: &Config) -> Result<Out<Option<Session>>> {
    let session = session::resume(config, Utc::now())
        .await
        .pub_result(ErrorType::Local)?;
    let message = match &session {
        Some(s) => format!("Logged in as {} ({})", s.username, s.role),
        None => "Nobody is logged in".to_string(),
    };
    Ok(Out::new(message, session))
}
