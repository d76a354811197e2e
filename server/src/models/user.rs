// server/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Customer,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Customer => "customer",
      Role::Admin => "admin",
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role: Role,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn public(&self) -> PublicUser {
    PublicUser {
      id: self.id,
      username: self.username.clone(),
      email: self.email.clone(),
    }
  }
}

/// What a user may see about an account: never the hash, never the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
  pub id: i64,
  pub username: String,
  pub email: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub email: String,
  pub password_hash: String,
  pub role: Role,
}
