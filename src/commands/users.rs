//! Administrator account management.

use crate::api::Mode;
use crate::args::{AddUserArgs, RemoveUserArgs};
use crate::commands::{connect, plural, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::{AdminUser, Role};
use crate::session;
use crate::{Config, Result};
use chrono::Utc;
use tracing::info;

/// Lists administrator accounts, newest first. Requires a login.
pub async fn users_list(config: &Config, mode: Mode) -> Result<Out<Vec<AdminUser>>> {
    session::require_login(config, Utc::now()).await?;
    let mut remote = connect(config, mode).await?;
    let users = remote.users().await.pub_result(ErrorType::Remote)?;

    let mut lines = vec![plural(users.len(), "account", "accounts")];
    for user in &users {
        let created = match user.created_at {
            Some(t) => t
                .with_timezone(&config.utc_offset())
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            None => "-".to_string(),
        };
        lines.push(format!(
            "{:<8} {:<20} {:<6} {created}",
            user.id, user.username, user.role
        ));
    }
    Ok(Out::new(lines.join("\n"), users))
}

/// Creates an administrator account.
///
/// While no accounts exist anybody may create one and it is always an owner. After that only a
/// logged-in owner can add accounts.
///
/// # Errors
/// - A validation error for an empty username or password, or when the confirmation differs.
/// - An authorization error when the caller is not an owner.
/// - A duplicate error when the username is taken.
pub async fn users_add(config: &Config, mode: Mode, args: &AddUserArgs) -> Result<Out<()>> {
    let username = args.username.trim();
    if username.is_empty() || args.password.is_empty() {
        return Err(public_error(
            ErrorType::Validation,
            "a username and a password are required",
        ));
    }
    if args.password != args.confirm_password {
        return Err(public_error(
            ErrorType::Validation,
            "the password confirmation does not match",
        ));
    }

    let mut remote = connect(config, mode).await?;
    let existing = remote.users().await.pub_result(ErrorType::Remote)?;
    let role = if existing.is_empty() {
        info!("No accounts exist yet, {username} will be the owner");
        Role::Owner
    } else {
        session::require_login(config, Utc::now())
            .await?
            .verify_owner(&mut remote)
            .await?;
        args.role
    };

    if remote
        .username_exists(username)
        .await
        .pub_result(ErrorType::Remote)?
    {
        return Err(public_error(
            ErrorType::Duplicate,
            format!("the username '{username}' is already taken"),
        ));
    }
    remote
        .add_user(username, &args.password, role, Utc::now())
        .await
        .pub_result(ErrorType::Remote)?;
    Ok(format!("Added {username} ({role})").into())
}

/// Deletes the administrator account with the given id. Requires an owner and `--yes`.
///
/// The last remaining owner cannot be removed.
pub async fn users_remove(config: &Config, mode: Mode, args: &RemoveUserArgs) -> Result<Out<()>> {
    if !args.yes {
        return Err(public_error(
            ErrorType::Validation,
            format!("removing account {} cannot be undone, add --yes to confirm", args.id),
        ));
    }
    let session = session::require_login(config, Utc::now()).await?;
    let mut remote = connect(config, mode).await?;
    session.verify_owner(&mut remote).await?;

    let users = remote.users().await.pub_result(ErrorType::Remote)?;
    let Some(user) = users.iter().find(|u| u.id == args.id) else {
        return Err(public_error(
            ErrorType::Validation,
            format!("there is no account with id {}", args.id),
        ));
    };
    if user.is_owner() && users.iter().filter(|u| u.is_owner()).count() == 1 {
        return Err(public_error(
            ErrorType::Validation,
            format!("{} is the last owner and cannot be removed", user.username),
        ));
    }
    remote
        .delete_user(&user.id)
        .await
        .pub_result(ErrorType::Remote)?;
    Ok(format!("Removed {}", user.username).into())
}
