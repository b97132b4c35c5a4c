use crate::errors::ApiResult;
use crate::models::credentials::Credentials;
use crate::security::{validation, FormErrors, MIN_PASSWORD_LENGTH};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl From<TokenPair> for Credentials {
    fn from(tokens: TokenPair) -> Self {
        Credentials::new(tokens.access, tokens.refresh)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub listing_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// "First Last", or the username when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password2: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = FormErrors::new();
        errors.check("email", validation::validate_email(&self.email));
        errors.check(
            "username",
            validation::validate_required(&self.username, "Username is required"),
        );
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        if self.password != self.password2 {
            errors.add("password2", "Passwords do not match.");
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub tokens: TokenPair,
    pub user: User,
}

/// Editable profile fields; unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = FormErrors::new();
        if let Some(avatar) = self.avatar.as_deref().filter(|a| !a.is_empty()) {
            if validation::validate_url(avatar).is_err() {
                errors.add("avatar", "Avatar must be a valid URL.");
            }
        }
        if let Some(username) = &self.username {
            errors.check(
                "username",
                validation::validate_required(username, "Username cannot be blank"),
            );
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    /// Repeated new password, checked locally and never sent
    #[serde(skip)]
    pub confirm: String,
}

impl PasswordChange {
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = FormErrors::new();
        if self.new_password != self.confirm {
            errors.add("confirm", "New passwords don't match.");
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "new_password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        errors.finish()
    }
}

/// Profile page counters; the host block is present only for hosts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileStats {
    pub total_trips: u64,
    pub upcoming_trips: u64,
    pub completed_trips: u64,
    pub total_reviews: u64,
    #[serde(default)]
    pub total_listings: Option<u64>,
    #[serde(default)]
    pub active_listings: Option<u64>,
    #[serde(default)]
    pub host_bookings: Option<u64>,
    #[serde(default)]
    pub pending_bookings: Option<u64>,
    #[serde(default)]
    pub total_revenue: Option<Decimal>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_host_reviews: Option<u64>,
}

impl ProfileStats {
    pub fn is_host(&self) -> bool {
        self.total_listings.is_some()
    }
}
