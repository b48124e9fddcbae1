use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::AppState;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EMPLOYER: &str = "employer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    pub fn has_role(&self, allowed: &[&str]) -> bool {
        let role = self.role.as_deref().unwrap_or_default();
        allowed.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// Signs an HS256 token for `sub` valid for `ttl_secs`.
pub fn issue_token(secret: &str, sub: &str, role: &str, ttl_secs: u64) -> Result<String> {
    let exp = chrono::Utc::now().timestamp() as u64 + ttl_secs;
    let claims = Claims {
        sub: sub.to_string(),
        exp: exp as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

fn bearer_claims(req: &Request, secret: &str) -> std::result::Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(AUTHORIZATION) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_token"))
}

async fn authorize(state: &AppState, mut req: Request, next: Next, allowed: &[&str]) -> Response {
    let claims = match bearer_claims(&req, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(rejection) => return rejection,
    };
    if !claims.has_role(allowed) {
        tracing::warn!(sub = %claims.sub, role = ?claims.role, "Role not permitted");
        return reject(StatusCode::FORBIDDEN, "forbidden");
    }
    req.extensions_mut().insert(claims);
    next.run(req).await
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    authorize(&state, req, next, &[ROLE_ADMIN]).await
}

/// Employers may submit postings; admins may do anything an employer can.
pub async fn require_employer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    authorize(&state, req, next, &[ROLE_EMPLOYER, ROLE_ADMIN]).await
}
