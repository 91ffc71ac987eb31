//! Caller identity for every request.
//!
//! A bearer JWT, issued elsewhere, carries the user id, role and permission
//! names. [`Caller`] is extracted from it per request and handed explicitly to
//! the orchestrator and services; nothing reads identity from ambient state.

use std::fmt;

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::sqlite::schema::{ROLE_ADMIN, ROLE_LECTURER, ROLE_STUDENT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Student,
    Lecturer,
    Other(String),
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            ROLE_ADMIN => Role::Admin,
            ROLE_STUDENT => Role::Student,
            ROLE_LECTURER => Role::Lecturer,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Student => ROLE_STUDENT,
            Role::Lecturer => ROLE_LECTURER,
            Role::Other(name) => name,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the rest of the backend may ask about the caller.
pub trait AccessContext: Send + Sync {
    fn current_user_id(&self) -> Uuid;
    fn current_role(&self) -> &Role;
    fn has_permission(&self, name: &str) -> bool;

    fn is_admin(&self) -> bool {
        *self.current_role() == Role::Admin
    }

    fn require_role(&self, role: Role) -> Result<(), AppError> {
        if *self.current_role() == role {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Forbidden: {role} role required")))
        }
    }

    /// Admins pass implicitly; anyone else needs the named permission.
    fn require_permission(&self, name: &str) -> Result<(), AppError> {
        if self.is_admin() || self.has_permission(name) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Forbidden: missing permission {name}")))
        }
    }

    /// Admins, or the user acting on their own account.
    fn require_admin_or_self(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.current_user_id() == user_id {
            Ok(())
        } else {
            Err(AppError::forbidden("Forbidden: you can only access your own account"))
        }
    }
}

/// Permission guarding account and profile administration.
pub const MANAGE_USERS: &str = "user:manage";

/// The resolved identity of a request.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
    pub permissions: Vec<String>,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role, permissions: Vec<String>) -> Self {
        Self {
            user_id,
            role,
            permissions,
        }
    }
}

impl AccessContext for Caller {
    fn current_user_id(&self) -> Uuid {
        self.user_id
    }

    fn current_role(&self) -> &Role {
        &self.role
    }

    fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p == name)
    }
}

/// Claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub role_name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

/// Verifies HS256 access tokens against the shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Caller, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!("Rejected access token: {e}");
            AppError::unauthorized("invalid or expired token")
        })?;

        let claims = data.claims;
        Ok(Caller::new(claims.user_id, Role::from_name(&claims.role_name), claims.permissions))
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("malformed authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("expected a bearer token"))
}

fn resolve(req: &HttpRequest) -> Result<Caller, AppError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| AppError::Internal("token verifier is not configured".into()))?;
    verifier.verify(bearer_token(req)?)
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}
