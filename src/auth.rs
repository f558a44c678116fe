//! Account boundary: registration, login, and session tokens for the two
//! roles (student and teacher).
//!
//! Accounts live in an in-memory registry keyed by `(role, email)`. Passwords
//! are bcrypt-hashed (cost 10) before storage and the hash never leaves this
//! module; on success a signed JWT with a 10-day expiry is issued and set as
//! the `token` cookie by the handler layer. There is no refresh, revocation,
//! or role-based authorization beyond presence of the cookie.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::util::normalize_email;

/// bcrypt cost factor for password hashing.
pub const BCRYPT_COST: u32 = 10;

/// Session token lifetime.
pub const TOKEN_TTL_DAYS: i64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    /// Label used in user-facing messages ("User registered successfully").
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "User",
            Role::Teacher => "Teacher",
        }
    }
}

/// Why an account operation did not produce an account.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// An account with this email already exists for the role.
    Duplicate,
    /// No account with this email exists for the role.
    UnknownAccount,
    /// The password did not match the stored hash.
    InvalidCredentials,
    /// Hashing or token signing failed.
    Internal(String),
}

/// Internal account record. Carries the password hash, so it is never
/// serialized; API responses go through the hash-free DTO in `protocol`.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub(crate) password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory account store shared by the HTTP handlers.
#[derive(Clone)]
pub struct AccountRegistry {
    accounts: Arc<RwLock<HashMap<(Role, String), Account>>>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self { accounts: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Create an account. Duplicate email (per role) is reported, not
    /// overwritten; the stored email is normalized for lookup.
    #[instrument(level = "info", skip(self, password), fields(?role, %email))]
    pub async fn register(
        &self,
        role: Role,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, AuthError> {
        let email = normalize_email(email);
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&(role, email.clone())) {
            warn!(target: "auth", %email, "Registration for existing account");
            return Err(AuthError::Duplicate);
        }

        let password_hash =
            bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::Internal(e.to_string()))?;
        let account = Account {
            id: Uuid::new_v4().to_string(),
            role,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.clone(),
            password_hash,
            created_at: Utc::now(),
        };
        accounts.insert((role, email.clone()), account.clone());
        info!(target: "auth", %email, id = %account.id, "Account registered");
        Ok(account)
    }

    /// Verify credentials. Unknown email and wrong password are distinct
    /// errors so the handler can surface distinct messages.
    #[instrument(level = "info", skip(self, password), fields(?role, %email))]
    pub async fn login(&self, role: Role, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = normalize_email(email);
        let accounts = self.accounts.read().await;
        let Some(account) = accounts.get(&(role, email.clone())) else {
            warn!(target: "auth", %email, "Login for unknown account");
            return Err(AuthError::UnknownAccount);
        };
        let valid = bcrypt::verify(password, &account.password_hash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !valid {
            warn!(target: "auth", %email, "Login with invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }
        info!(target: "auth", %email, id = %account.id, "Login successful");
        Ok(account.clone())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    exp: usize,
}

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "ecolearn-dev-secret".into())
}

/// Sign a session token for an account id, valid for [`TOKEN_TTL_DAYS`].
pub fn issue_token(account_id: &str) -> Result<String, AuthError> {
    let exp = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
    let claims = Claims { id: account_id.to_string(), exp };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret().as_bytes()))
        .map_err(|e| AuthError::Internal(e.to_string()))
}

/// Decode a session token back to the account id it was issued for.
#[allow(dead_code)]
pub fn validate_token(token: &str) -> Result<String, AuthError> {
    decode::<Claims>(token, &DecodingKey::from_secret(jwt_secret().as_bytes()), &Validation::default())
        .map(|data| data.claims.id)
        .map_err(|e| AuthError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let registry = AccountRegistry::new();
        registry
            .register(Role::Student, "Meera", "Iyer", "meera@student.edu", "hunter2")
            .await
            .expect("first registration");
        let second = registry
            .register(Role::Student, "Meera", "Iyer", "MEERA@student.edu", "hunter2")
            .await;
        assert_eq!(second.unwrap_err(), AuthError::Duplicate);
    }

    #[tokio::test]
    async fn same_email_is_independent_across_roles() {
        let registry = AccountRegistry::new();
        registry
            .register(Role::Student, "Dev", "Rao", "dev@school.edu", "pw-one")
            .await
            .expect("student");
        registry
            .register(Role::Teacher, "Dev", "Rao", "dev@school.edu", "pw-two")
            .await
            .expect("teacher with same email");
    }

    #[tokio::test]
    async fn login_verifies_the_stored_hash() {
        let registry = AccountRegistry::new();
        let created = registry
            .register(Role::Student, "Meera", "Iyer", "meera@student.edu", "hunter2")
            .await
            .unwrap();

        let account = registry
            .login(Role::Student, "meera@student.edu", "hunter2")
            .await
            .expect("valid login");
        assert_eq!(account.id, created.id);

        assert_eq!(
            registry.login(Role::Student, "meera@student.edu", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            registry.login(Role::Student, "ghost@student.edu", "hunter2").await.unwrap_err(),
            AuthError::UnknownAccount
        );
    }

    #[test]
    fn token_round_trips_through_validation() {
        let token = issue_token("account-42").expect("token issued");
        assert_eq!(validate_token(&token).expect("token valid"), "account-42");
    }
}
