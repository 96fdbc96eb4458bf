use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, CurrentUser, LoginRequest,
        RegisterRequest,
    },
    config::Config,
    error::AppError,
    models::{UpdatePasswordRequest, UpdateProfileRequest, User, UserProfile},
    store::UserStore,
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token together
/// with the sanitized profile. The password is hashed before it is stored and
/// never appears in any response.
#[post("/register")]
pub async fn register(
    users: web::Data<dyn UserStore>,
    config: web::Data<Config>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;
    let register_data = register_data.into_inner();

    let email = register_data.email.to_lowercase();

    // Check if email already exists
    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    // Hash password
    let password_hash = hash_password(&register_data.password)?;

    let user = users
        .insert(User::new(register_data.name, email, password_hash))
        .await?;

    // Generate token
    let token = generate_token(user.id, &config.jwt_secret, config.token_ttl_hours)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        token,
        user: UserProfile::from(user),
    }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token. An unknown email
/// and a wrong password produce the same response, so login attempts cannot
/// reveal whether an address is registered.
#[post("/login")]
pub async fn login(
    users: web::Data<dyn UserStore>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let user = users
        .find_by_email(&login_data.email.to_lowercase())
        .await?;

    match user {
        Some(user) => {
            // Verify password
            if verify_password(&login_data.password, &user.password_hash)? {
                let token = generate_token(user.id, &config.jwt_secret, config.token_ttl_hours)?;
                Ok(HttpResponse::Ok().json(AuthResponse {
                    success: true,
                    token,
                    user: UserProfile::from(user),
                }))
            } else {
                Err(AppError::Unauthorized("Invalid credentials".into()))
            }
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}

/// Fetch the caller's own profile, as attached by the authorization gate.
#[get("/me")]
pub async fn me(user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": user.0
    })))
}

/// Update the caller's profile (name, email, avatar).
///
/// Only the supplied fields are changed. An email change re-checks uniqueness.
#[put("/profile")]
pub async fn update_profile(
    users: web::Data<dyn UserStore>,
    profile_data: web::Json<UpdateProfileRequest>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    profile_data.validate()?;
    let profile_data = profile_data.into_inner();

    let mut record = users
        .find_by_id(user.0.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    if let Some(name) = profile_data.name {
        record.name = name;
    }
    if let Some(email) = profile_data.email {
        let email = email.to_lowercase();
        if email != record.email {
            if users.find_by_email(&email).await?.is_some() {
                return Err(AppError::Conflict("Email already registered".into()));
            }
            record.email = email;
        }
    }
    if let Some(avatar) = profile_data.avatar {
        record.avatar = Some(avatar);
    }

    let updated = users.update(record).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": UserProfile::from(updated)
    })))
}

/// Change the caller's password.
///
/// The current password must verify against the stored hash before the new
/// one is accepted and rehashed.
#[put("/password")]
pub async fn update_password(
    users: web::Data<dyn UserStore>,
    password_data: web::Json<UpdatePasswordRequest>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    password_data.validate()?;

    // The attached profile excludes the hash; reload the full record.
    let mut record = users
        .find_by_id(user.0.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    if !verify_password(&password_data.current_password, &record.password_hash)? {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    record.password_hash = hash_password(&password_data.new_password)?;
    users.update(record).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password updated"
    })))
}
