use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::UserProfile;

/// Extracts the authenticated user's sanitized profile from request extensions.
///
/// This extractor is intended to be used on routes protected by `AuthMiddleware`,
/// which is responsible for validating the JWT, resolving the account, and
/// inserting the profile into request extensions.
///
/// If the profile is not found in the extensions (e.g., if `AuthMiddleware` did
/// not run), this extractor returns an `AppError::Unauthorized` error.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserProfile>().cloned() {
            Some(profile) => ready(Ok(CurrentUser(profile))),
            None => {
                // Only reachable when a handler is mounted outside the guarded
                // scope; responding with Unauthorized is the safe default.
                let err = AppError::Unauthorized(
                    "User not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
