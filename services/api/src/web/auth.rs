//! services/api/src/web/auth.rs
//!
//! User endpoints: registration, login, profile, logout and the user directory.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::{Duration, Utc};
use codewithchat_core::domain::{NewUser, User};
use codewithchat_core::ports::PortError;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::models::{
    AuthResponse, LoginRequest, MessageResponse, ProfileResponse, RegisterForm, UserResponse,
    UsersResponse,
};
use crate::web::state::{AppState, AuthContext};

/// How long an issued token stays valid.
pub const TOKEN_TTL_DAYS: i64 = 30;

const MIN_PASSWORD_LEN: usize = 3;

//=========================================================================================
// Validation
//=========================================================================================

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern is valid"))
}

/// Trims and lowercases an email, rejecting anything without a single `@`.
pub fn normalize_email(raw: &str) -> Result<String, HttpError> {
    let email = raw.trim().to_lowercase();
    if !email_pattern().is_match(&email) {
        return Err(HttpError::bad_request("A valid email is required"));
    }
    Ok(email)
}

impl RegisterForm {
    /// Reads the registration form. Unknown parts are skipped; an uploaded
    /// `profilePic` file is accepted but not stored.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, HttpError> {
        let mut form = RegisterForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| HttpError::bad_request(format!("Failed to read multipart data: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "profilePic" && field.file_name().is_some() {
                debug!("Ignoring uploaded profile picture {:?}", field.file_name());
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| HttpError::bad_request(format!("Invalid form field {}: {}", name, e)))?;
            match name.as_str() {
                "name" => form.name = value,
                "email" => form.email = value,
                "password" => form.password = value,
                // Browsers send the literal "null" for an empty file input.
                "profilePic" if !value.is_empty() && value != "null" => {
                    form.profile_pic = Some(value)
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Checks the form and returns the normalized email.
    pub fn validate(&self) -> Result<String, HttpError> {
        if self.name.trim().is_empty() {
            return Err(HttpError::bad_request("Name is required"));
        }
        let email = normalize_email(&self.email)?;
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(HttpError::bad_request(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(email)
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_password(password: &str) -> Result<String, HttpError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            HttpError::internal("Failed to hash password")
        })
}

fn verify_password(password: &str, hashed: &str) -> Result<bool, HttpError> {
    let parsed_hash = PasswordHash::new(hashed).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        HttpError::internal("Authentication error")
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Creates a fresh session for `user` and builds the auth response.
async fn issue_token(state: &AppState, user: User) -> Result<AuthResponse, HttpError> {
    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(TOKEN_TTL_DAYS);

    state
        .db
        .create_auth_session(&token, user.id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            HttpError::internal("Failed to create session")
        })?;

    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /users/register - Create a new user account
#[utoipa::path(
    post,
    path = "/users/register",
    request_body(content_type = "multipart/form-data", description = "Fields: name, email, password, optional profilePic."),
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), HttpError> {
    let mut multipart = multipart?;
    let form = RegisterForm::from_multipart(&mut multipart).await?;
    let email = form.validate()?;
    let hashed_password = hash_password(&form.password)?;

    let user = state
        .db
        .create_user(NewUser {
            name: form.name.trim().to_string(),
            email,
            hashed_password,
            profile_pic: form.profile_pic,
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => {
                HttpError::new(StatusCode::CONFLICT, "User with this email already exists")
            }
            other => other.into(),
        })?;

    info!("Registered user {}", user.id);
    let response = issue_token(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /users/login - Login with existing account
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, HttpError> {
    let Json(req) = payload?;
    let invalid = || HttpError::unauthorized("Invalid credentials");

    let email = normalize_email(&req.email).map_err(|_| invalid())?;
    let credentials = state.db.get_user_by_email(&email).await.map_err(|e| match e {
        PortError::NotFound(_) => invalid(),
        other => other.into(),
    })?;

    if !verify_password(&req.password, &credentials.hashed_password)? {
        return Err(invalid());
    }

    let response = issue_token(&state, credentials.user).await?;
    Ok(Json(response))
}

/// GET /users/profile - The current user
#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "The authenticated user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProfileResponse>, HttpError> {
    let user = state.db.get_user_by_id(auth.user_id).await?;
    Ok(Json(ProfileResponse { user: user.into() }))
}

/// POST /users/logout - Invalidate the presented token
#[utoipa::path(
    post,
    path = "/users/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, HttpError> {
    state.db.delete_auth_session(&auth.token).await.map_err(|e| {
        error!("Failed to delete auth session: {:?}", e);
        HttpError::internal("Failed to logout")
    })?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// GET /users/all - Every user except the caller
#[utoipa::path(
    get,
    path = "/users/all",
    responses(
        (status = 200, description = "Other users", body = UsersResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn all_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UsersResponse>, HttpError> {
    let users = state.db.list_users_except(auth.user_id).await?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            profile_pic: None,
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(normalize_email("").is_err());
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("a@b@c").is_err());
    }

    #[test]
    fn test_register_form_validation() {
        assert!(form("Ada", "ada@example.com", "secret").validate().is_ok());
        assert!(form(" ", "ada@example.com", "secret").validate().is_err());
        assert!(form("Ada", "ada", "secret").validate().is_err());
        assert!(form("Ada", "ada@example.com", "ab").validate().is_err());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hashed = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }
}
