//! The logged-in administrator and the idle timeout that ends their session.
//!
//! A one-shot command is an interaction: it resumes the session from `session.json`, which either
//! expires it (too long since `last_activity`) or touches it. The interactive shell additionally
//! keeps an `IdleWatchdog` that fires while the user is sitting at the prompt.

use crate::api::Remote;
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::{AdminUser, Role};
use crate::{utils, Config, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// The message of every failed role check. It does not say which check failed.
pub const NOT_AUTHORIZED: &str = "not authorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub role: Role,
    pub logged_in_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(user: &AdminUser, now: DateTime<Utc>) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            logged_in_at: now,
            last_activity: now,
        }
    }

    /// True when more than `timeout` has passed between the last activity and `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        // A clock that went backwards counts as no idle time.
        let idle = (now - self.last_activity).to_std().unwrap_or_default();
        idle > timeout
    }

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// Fails with an authorization error unless the session belongs to an owner.
    pub fn require_owner(&self) -> Result<()> {
        if self.is_owner() {
            Ok(())
        } else {
            debug!("{} is not an owner", self.username);
            Err(public_error(ErrorType::Authorization, NOT_AUTHORIZED))
        }
    }

    /// Like `require_owner`, but checks the account's current row in the store rather than the
    /// role saved at login. Fails if the account has since been removed or is no longer an owner.
    pub async fn verify_owner(&self, remote: &mut Remote) -> Result<AdminUser> {
        self.require_owner()?;
        let users = remote.users().await.pub_result(ErrorType::Remote)?;
        match users.into_iter().find(|u| u.username == self.username) {
            Some(user) if user.is_owner() => Ok(user),
            Some(_) => {
                warn!("{} is no longer an owner", self.username);
                Err(public_error(ErrorType::Authorization, NOT_AUTHORIZED))
            }
            None => {
                warn!("The account of {} no longer exists", self.username);
                Err(public_error(ErrorType::Authorization, NOT_AUTHORIZED))
            }
        }
    }
}

/// Loads the session and applies the idle timeout as of `now`.
///
/// - No session file: `None`.
/// - Idle for longer than the configured window: the file is removed, a warning is logged and
///   `None` is returned.
/// - Otherwise `last_activity` is moved to `now` and saved.
pub async fn resume(config: &Config, now: DateTime<Utc>) -> Result<Option<Session>> {
    let path = config.session_path();
    if !path.is_file() {
        return Ok(None);
    }
    let mut session: Session = utils::deserialize(&path).await?;
    if session.is_expired(now, config.idle_timeout()) {
        utils::remove(&path).await?;
        warn!("{} was logged out after inactivity", session.username);
        return Ok(None);
    }
    session.last_activity = now;
    utils::serialize(&path, &session).await?;
    Ok(Some(session))
}

/// Persists a new session, replacing any existing one.
pub async fn start(config: &Config, session: &Session) -> Result<()> {
    utils::serialize(&config.session_path(), session).await
}

/// Removes the session. Returns false if there was none.
pub async fn end(config: &Config) -> Result<bool> {
    let path = config.session_path();
    if !path.is_file() {
        return Ok(false);
    }
    utils::remove(&path).await?;
    Ok(true)
}

/// Resumes the session and fails with an authorization error if nobody is logged in.
pub async fn require_login(config: &Config, now: DateTime<Utc>) -> Result<Session> {
    resume(config, now).await?.ok_or_else(|| {
        public_error(
            ErrorType::Authorization,
            "not logged in, run 'fund login' first",
        )
    })
}

/// A single idle deadline that every interaction pushes back.
///
/// `expired()` can be raced against input in a `tokio::select!`; calling `reset()` after an
/// interaction replaces the deadline, so there is never more than one pending timeout.
#[derive(Debug, Clone)]
pub struct IdleWatchdog {
    timeout: Duration,
    deadline: Instant,
}

impl IdleWatchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: Instant::now() + timeout,
        }
    }

    pub fn reset(&mut self) {
        self.deadline = Instant::now() + self.timeout;
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Completes when the current deadline passes.
    pub async fn expired(&self) {
        sleep_until(self.deadline).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    fn owner() -> AdminUser {
        AdminUser {
            id: "1".to_string(),
            username: "sari".to_string(),
            role: Role::Owner,
            created_at: None,
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_is_expired() {
        let session = Session::new(&owner(), at("2026-10-17T10:00:00Z"));
        let window = Duration::from_secs(300);
        assert!(!session.is_expired(at("2026-10-17T10:05:00Z"), window));
        assert!(session.is_expired(at("2026-10-17T10:05:01Z"), window));
        assert!(!session.is_expired(at("2026-10-17T09:00:00Z"), window));
    }

    #[test]
    fn test_require_owner() {
        let mut session = Session::new(&owner(), Utc::now());
        assert!(session.require_owner().is_ok());
        session.role = Role::Admin;
        let err = session.require_owner().unwrap_err();
        assert_eq!(crate::error::error_type(&err), Some(ErrorType::Authorization));
        assert!(format!("{err:#}").ends_with(NOT_AUTHORIZED));
    }

    #[tokio::test]
    async fn test_resume_touches_active_session() {
        let env = TestEnv::new().await;
        let config = env.config();
        start(&config, &Session::new(&owner(), at("2026-10-17T10:00:00Z")))
            .await
            .unwrap();

        let session = resume(&config, at("2026-10-17T10:04:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.last_activity, at("2026-10-17T10:04:00Z"));

        // The touch moved the window, so this is still within five minutes.
        let session = resume(&config, at("2026-10-17T10:08:30Z")).await.unwrap();
        assert!(session.is_some());
    }

    #[tokio::test]
    async fn test_resume_expires_idle_session() {
        let env = TestEnv::new().await;
        let config = env.config();
        start(&config, &Session::new(&owner(), at("2026-10-17T10:00:00Z")))
            .await
            .unwrap();

        let session = resume(&config, at("2026-10-17T10:06:00Z")).await.unwrap();
        assert!(session.is_none());
        assert!(!config.session_path().exists());
        assert!(require_login(&config, at("2026-10-17T10:06:00Z"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_end() {
        let env = TestEnv::new().await;
        let config = env.config();
        assert!(!end(&config).await.unwrap());
        start(&config, &Session::new(&owner(), Utc::now()))
            .await
            .unwrap();
        assert!(end(&config).await.unwrap());
        assert!(resume(&config, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_fires_after_window() {
        let watchdog = IdleWatchdog::new(Duration::from_secs(300));
        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(!watchdog.is_expired());
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(watchdog.is_expired());
        watchdog.expired().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_reset_postpones_deadline() {
        let mut watchdog = IdleWatchdog::new(Duration::from_secs(300));
        tokio::time::advance(Duration::from_secs(200)).await;
        watchdog.reset();
        tokio::time::advance(Duration::from_secs(200)).await;
        assert!(!watchdog.is_expired());

        let fired = tokio::select! {
            _ = watchdog.expired() => true,
            _ = tokio::time::sleep(Duration::from_secs(50)) => false,
        };
        assert!(!fired);

        let started = Instant::now();
        watchdog.expired().await;
        assert_eq!(started.elapsed(), Duration::from_secs(50));
    }

    #[tokio::test]
    async fn test_verify_owner_uses_current_role() {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Owner).await;
        env.login("sari").await;
        let config = env.config();
        let session = require_login(&config, Utc::now()).await.unwrap();
        let mut remote = crate::api::remote(&config, crate::Mode::Testing)
            .await
            .unwrap();
        assert_eq!(session.verify_owner(&mut remote).await.unwrap().username, "sari");

        let mut state = env.get_state();
        let table = config.tables().users.clone();
        for row in state.tables.get_mut(&table).unwrap() {
            row["role"] = serde_json::json!("admin");
        }
        env.set_state(state);

        assert!(session.require_owner().is_ok());
        let err = session.verify_owner(&mut remote).await.unwrap_err();
        assert_eq!(crate::error::error_type(&err), Some(ErrorType::Authorization));
    }
}
