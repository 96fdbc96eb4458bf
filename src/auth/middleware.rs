use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::token::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::models::UserProfile;
use crate::store::UserStore;

/// The authorization gate applied to the `/api` scope.
///
/// Composes credential verification (bearer token extraction + JWT check) with
/// identity resolution (loading the account behind the token's subject claim).
/// On success the sanitized [`UserProfile`] is attached to request extensions
/// for the [`CurrentUser`](crate::auth::extractors::CurrentUser) extractor;
/// any failure short-circuits with a rendered 401 response before the handler
/// runs. Handlers never re-check identity themselves.
pub struct AuthMiddleware {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
}

impl AuthMiddleware {
    pub fn new(users: Arc<dyn UserStore>, config: &Config) -> Self {
        Self {
            users,
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            users: Arc::clone(&self.users),
            jwt_secret: self.jwt_secret.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    users: Arc<dyn UserStore>,
    jwt_secret: String,
}

/// Turns a rejected request into the gate's JSON error response. The rejection
/// is a completed response, not a service error, so it reaches every caller
/// the same way a handler response would.
fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Registration and login are the only public routes under /api.
        let path = req.path();
        if path == "/api/user/register" || path == "/api/user/login" {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) });
        }

        let service = Rc::clone(&self.service);
        let users = Arc::clone(&self.users);
        let jwt_secret = self.jwt_secret.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned);

            let token = match token {
                Some(token) => token,
                None => {
                    return Ok(reject(
                        req,
                        AppError::Unauthorized("Not authorized, token missing".into()),
                    ))
                }
            };

            let claims = match verify_token(&token, &jwt_secret) {
                Ok(claims) => claims,
                Err(err) => return Ok(reject(req, err)),
            };

            // The token may be structurally valid but stale, e.g. issued for
            // an account that no longer exists.
            let user = match users.find_by_id(claims.sub).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    return Ok(reject(
                        req,
                        AppError::Unauthorized("User not found".into()),
                    ))
                }
                Err(err) => return Ok(reject(req, err)),
            };

            req.extensions_mut().insert(UserProfile::from(user));
            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}
