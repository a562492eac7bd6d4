use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload, web::Data};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::AppState;
use crate::config::Config;
use crate::database::models::UserRole;
use crate::error::AppError;

/// Claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub department: Option<String>,
    pub exp: usize, // expiration time
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let (Some(token), Some(state)) = (token, req.app_data::<Data<AppState>>()) else {
            return ready(Err(AppError::Unauthenticated.into()));
        };

        match state.auth_service.verify_token(token) {
            Ok(claims) => ready(Ok(claims)),
            Err(err) => {
                log::debug!("Rejected bearer token: {}", err);
                ready(Err(AppError::Unauthenticated.into()))
            }
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    config: Config,
}

impl AuthService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Sign a token the way the identity provider does. Used by local
    /// tooling and tests; production tokens come from the provider.
    pub fn issue_token(
        &self,
        user_id: &str,
        email: &str,
        role: UserRole,
        department: Option<&str>,
    ) -> Result<String> {
        let expiration = (Utc::now() + Duration::days(self.config.jwt_expiration_days)).timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            department: department.map(str::to_string),
            exp: expiration.max(0) as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_round_trip_through_verification() {
        let service = AuthService::new(Config::test_config());

        let token = service
            .issue_token("emp-1", "emp@example.com", UserRole::Employee, Some("Kitchen"))
            .unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "emp-1");
        assert_eq!(claims.role, UserRole::Employee);
        assert_eq!(claims.department.as_deref(), Some("Kitchen"));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let mut other = Config::test_config();
        other.jwt_secret = "another-secret-that-is-also-long-enough".to_string();
        let token = AuthService::new(other)
            .issue_token("mgr-1", "mgr@example.com", UserRole::Manager, None)
            .unwrap();

        assert!(AuthService::new(Config::test_config()).verify_token(&token).is_err());
    }
}
