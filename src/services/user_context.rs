use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::database::models::UserRole;
use crate::error::AppError;
use crate::services::auth::Claims;

/// Identity of the caller, passed explicitly into every service call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestContext {
    pub user_id: String,
    pub role: UserRole,
    pub department: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            department: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_manager_or_admin(&self) -> bool {
        self.role.is_manager_or_admin()
    }

    /// Managers and admins can act on anyone's records; employees only on their own.
    pub fn can_access(&self, owner_id: &str) -> bool {
        self.user_id == owner_id || self.is_manager_or_admin()
    }

    pub fn requires_manager(&self) -> Result<(), AppError> {
        if self.is_manager_or_admin() {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "Manager or admin role required".to_string(),
            ))
        }
    }

    pub fn requires_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Admin role required".to_string()))
        }
    }

    pub fn requires_same_user(&self, owner_id: &str) -> Result<(), AppError> {
        if self.can_access(owner_id) {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "Cannot access another user's records".to_string(),
            ))
        }
    }
}

impl From<Claims> for RequestContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            department: claims.department,
        }
    }
}

impl FromRequest for RequestContext {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        ready(
            Claims::from_request(req, payload)
                .into_inner()
                .map(RequestContext::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employees_only_access_their_own_records() {
        let ctx = RequestContext::new("emp-1", UserRole::Employee);

        assert!(ctx.can_access("emp-1"));
        assert!(!ctx.can_access("emp-2"));
        assert!(matches!(
            ctx.requires_manager(),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn managers_access_everything_but_admin_operations() {
        let ctx = RequestContext::new("mgr-1", UserRole::Manager);

        assert!(ctx.requires_same_user("emp-2").is_ok());
        assert!(ctx.requires_manager().is_ok());
        assert!(ctx.requires_admin().is_err());
    }
}
