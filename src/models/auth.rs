//! The signed-in user, decoded from the identity token carried by the session.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::booking::BookingRoute;
use crate::domain::types::CustomerId;
use crate::models::config::ServerConfig;
use crate::services::errors::ServiceResult;
use crate::services::query_builder::BookingListContext;

/// Profile id of system administrators.
pub const SYSTEM_ADMIN_PROFILE_ID: i32 = 1;

/// JWT claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub user_name: String,
    pub customer_id: Option<i64>,
    pub profile_id: i32,
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn is_system_admin(&self) -> bool {
        self.profile_id == SYSTEM_ADMIN_PROFILE_ID
    }

    /// Booking list context for `route` as seen by this user.
    pub fn booking_list_context(&self, route: BookingRoute) -> ServiceResult<BookingListContext> {
        let customer_id = self.customer_id.and_then(|id| CustomerId::new(id).ok());
        BookingListContext::new(route, self.is_system_admin(), customer_id)
    }

    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
    }
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let identity = req
        .get_identity()
        .map_err(|_| ErrorUnauthorized("not signed in"))?;
    let token = identity
        .id()
        .map_err(|_| ErrorUnauthorized("invalid identity"))?;
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorInternalServerError("server configuration missing"))?;

    AuthenticatedUser::from_token(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected identity token: {err}");
        ErrorUnauthorized("invalid token")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;
    use crate::services::errors::ServiceError;
    use crate::services::query_builder::Scope;

    const SECRET: &str = "test-secret";

    fn sign(user: &AuthenticatedUser, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            user,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn user(profile_id: i32, customer_id: Option<i64>) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user-1".to_string(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            user_name: "ana".to_string(),
            customer_id,
            profile_id,
            exp: 4_102_444_800,
        }
    }

    #[test]
    fn token_round_trip() {
        let original = user(2, Some(42));
        let token = sign(&original, SECRET);
        assert_eq!(AuthenticatedUser::from_token(&token, SECRET).unwrap(), original);
        assert!(AuthenticatedUser::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = user(2, Some(42));
        expired.exp = 1;
        let token = sign(&expired, SECRET);
        assert!(AuthenticatedUser::from_token(&token, SECRET).is_err());
    }

    #[test]
    fn context_follows_profile() {
        let admin = user(SYSTEM_ADMIN_PROFILE_ID, None)
            .booking_list_context(BookingRoute::Hotel)
            .unwrap();
        assert_eq!(admin.scope, Scope::AllCustomers);

        let member = user(3, Some(42))
            .booking_list_context(BookingRoute::Hotel)
            .unwrap();
        assert_eq!(member.scope, Scope::Customer(CustomerId::new(42).unwrap()));

        assert!(matches!(
            user(3, None).booking_list_context(BookingRoute::Hotel),
            Err(ServiceError::Unauthorized)
        ));
    }
}
