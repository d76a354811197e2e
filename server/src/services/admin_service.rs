// server/src/services/admin_service.rs

//! Account bootstrap and the moderation operations behind `/admin`.
//!
//! Moderation reasons are logged on the `admin_audit` target; only order
//! rejections persist theirs.

use chrono::{Duration as ChronoDuration, Utc};
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::{NewUser, Role, User};
use crate::services::auth_service::{self, HashCost};
use crate::store::{DashboardStats, ShopStore};
use crate::validation::{validate_email, validate_username};

pub const STATS_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
  Created,
  Promoted,
  AlreadyAdmin,
  /// No `ADMIN_PASSWORD` and no admin row to fall back on.
  Skipped,
}

/// Makes sure the configured administrator exists with the admin role.
#[instrument(name = "admin_service::ensure_admin_account", skip_all, fields(admin_email = %config.admin_email), err(Display))]
pub async fn ensure_admin_account(store: &dyn ShopStore, config: &AppConfig) -> Result<BootstrapOutcome> {
  if let Some(existing) = store.find_user_by_email(&config.admin_email).await? {
    if existing.is_admin() {
      return Ok(BootstrapOutcome::AlreadyAdmin);
    }
    store.set_user_role(existing.id, Role::Admin).await?;
    info!(target: "admin_audit", user_id = existing.id, "Promoted configured account to administrator.");
    return Ok(BootstrapOutcome::Promoted);
  }

  let Some(password) = config.admin_password.clone() else {
    warn!("ADMIN_PASSWORD is not set and no administrator exists; /admin stays unreachable.");
    return Ok(BootstrapOutcome::Skipped);
  };

  let password_hash = auth_service::hash_password_blocking(password, HashCost::from_config(config)).await?;
  let user = store
    .insert_user(NewUser {
      username: admin_username(&config.admin_email),
      email: config.admin_email.clone(),
      password_hash,
      role: Role::Admin,
    })
    .await
    .map_err(AppError::from_identity_write)?;
  info!(target: "admin_audit", user_id = user.id, "Administrator account created.");
  Ok(BootstrapOutcome::Created)
}

/// Local part of the email reduced to username characters, padded to the minimum length.
fn admin_username(email: &str) -> String {
  let local = email.split('@').next().unwrap_or_default();
  let mut name: String = local
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
    .take(50)
    .collect();
  if name.len() < 3 {
    name = "admin".to_string();
  }
  name
}

async fn modifiable_user(store: &dyn ShopStore, user_id: i64) -> Result<User> {
  let user = store
    .find_user_by_id(user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
  if user.is_admin() {
    return Err(AppError::Forbidden("The administrator account cannot be modified".to_string()));
  }
  Ok(user)
}

#[instrument(name = "admin_service::update_user", skip(store), err(Display))]
pub async fn update_user(store: &dyn ShopStore, user_id: i64, username: &str, email: &str) -> Result<User> {
  let current = modifiable_user(store, user_id).await?;
  validate_username(username)?;
  validate_email(email)?;

  for other in store.find_users_by_email_or_username(email, username).await? {
    if other.id == current.id {
      continue;
    }
    if other.email == email {
      return Err(AppError::email_exists());
    }
    if other.username == username {
      return Err(AppError::username_exists());
    }
  }

  let updated = store
    .update_user_identity(user_id, username, email)
    .await
    .map_err(AppError::from_identity_write)?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
  info!(target: "admin_audit", user_id, "User account updated.");
  Ok(updated)
}

/// `reason` must already be trimmed and non-empty.
#[instrument(name = "admin_service::delete_user", skip(store, reason), err(Display))]
pub async fn delete_user(store: &dyn ShopStore, user_id: i64, reason: &str) -> Result<()> {
  if reason.is_empty() {
    return Err(AppError::missing_fields("A reason is required to delete a user"));
  }
  let user = modifiable_user(store, user_id).await?;
  if !store.delete_user(user_id).await? {
    return Err(AppError::NotFound(format!("User {} not found", user_id)));
  }
  info!(target: "admin_audit", user_id, username = %user.username, reason, "User deleted.");
  Ok(())
}

#[instrument(name = "admin_service::delete_review", skip(store, reason), err(Display))]
pub async fn delete_review(store: &dyn ShopStore, review_id: i64, reason: &str) -> Result<()> {
  if reason.is_empty() {
    return Err(AppError::missing_fields("A reason is required to delete a review"));
  }
  if !store.delete_review(review_id).await? {
    return Err(AppError::NotFound(format!("Review {} not found", review_id)));
  }
  info!(target: "admin_audit", review_id, reason, "Review deleted.");
  Ok(())
}

pub async fn dashboard_stats(store: &dyn ShopStore) -> Result<DashboardStats> {
  let since = Utc::now() - ChronoDuration::days(STATS_WINDOW_DAYS);
  Ok(store.dashboard_stats(since).await?)
}
