use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_email_format, validate_optional_password, validate_password};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "account_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Regular,
    Superuser,
}

impl Display for AccountType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AccountType::Regular => write!(f, "regular"),
            AccountType::Superuser => write!(f, "superuser"),
        }
    }
}

/// User row including the password hash. Never serialized to clients.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
    pub last_logged_in: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_superuser(&self) -> bool {
        self.account_type == AccountType::Superuser
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserOut {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
    pub last_logged_in: Option<DateTime<Utc>>,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        UserOut {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            account_type: user.account_type,
            created_at: user.created_at,
            last_logged_in: user.last_logged_in,
        }
    }
}

/// Registration payload, also used by admins to create accounts.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,
    #[validate(
        length(max = 255, message = "Email must be at most 255 characters"),
        custom(function = "validate_email_format")
    )]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}

/// Self-service update. An empty or missing password keeps the current one.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,
    #[validate(
        length(max = 255, message = "Email must be at most 255 characters"),
        custom(function = "validate_email_format")
    )]
    pub email: String,
    #[validate(custom(function = "validate_optional_password"))]
    pub password: Option<String>,
}

/// Admin update of any account, including names.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminUserUpdate {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,
    #[validate(
        length(max = 255, message = "Email must be at most 255 characters"),
        custom(function = "validate_email_format")
    )]
    pub email: String,
    #[validate(custom(function = "validate_optional_password"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}
