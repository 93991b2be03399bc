use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use super::{
    claims::ACCESS_AUTH,
    dto::{LoginRequest, RegisterRequest, UpdateProfileRequest},
    jwt::JwtKeys,
    password::{self, MIN_PASSWORD_LEN},
    repo::UserStore,
    repo_types::{AuthToken, NewUser, ProfileUpdate, User},
};
use crate::error::ApiError;

/// A user together with the raw token just issued to them.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

fn clean_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required"));
    }
    Ok(name.to_string())
}

fn clean_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ApiError::Validation("invalid email"));
    }
    Ok(email.to_string())
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation("password too short"));
    }
    Ok(())
}

/// Signs a token for `user`, records it on the stored user and on the in-memory copy.
async fn issue_token(users: &dyn UserStore, keys: &JwtKeys, user: &mut User) -> Result<String, ApiError> {
    let token = keys.issue(user.id)?;
    let entry = AuthToken {
        access: ACCESS_AUTH.to_string(),
        token: token.clone(),
    };
    users.push_token(user.id, entry.clone()).await?;
    user.tokens.push(entry);
    Ok(token)
}

pub async fn register(
    users: &dyn UserStore,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> Result<Session, ApiError> {
    let name = clean_name(&req.name)?;
    let email = clean_email(&req.email)?;
    check_password(&req.password)?;

    let password_hash = password::hash(req.password).await?;
    let mut user = users
        .insert(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "user insert rejected");
            ApiError::from(e)
        })?;

    let token = issue_token(users, keys, &mut user).await?;
    info!(user_id = %user.id, "user registered");
    Ok(Session { user, token })
}

pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<Session, ApiError> {
    let email = req.email.trim();

    let Some(mut user) = users.find_by_email(email).await? else {
        warn!("login for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !password::verify(req.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(users, keys, &mut user).await?;
    info!(user_id = %user.id, sessions = user.tokens.len(), "user logged in");
    Ok(Session { user, token })
}

/// Resolves a presented token to its user. Every rejection is the same `Unauthorized`.
pub async fn authenticate(
    users: &dyn UserStore,
    keys: &JwtKeys,
    token: &str,
) -> Result<User, ApiError> {
    let claims = keys.verify(token).map_err(|e| {
        debug!(error = %e, "token verification failed");
        ApiError::Unauthorized
    })?;

    if claims.access != ACCESS_AUTH {
        debug!(access = %claims.access, "token with foreign access level");
        return Err(ApiError::Unauthorized);
    }

    users
        .find_by_token(claims.sub, token)
        .await?
        .ok_or_else(|| {
            debug!(user_id = %claims.sub, "token not held by any user");
            ApiError::Unauthorized
        })
}

pub async fn logout(users: &dyn UserStore, user: &User, token: &str) -> Result<(), ApiError> {
    users.remove_token(user.id, token).await?;
    info!(user_id = %user.id, "token revoked");
    Ok(())
}

/// Applies a partial profile change. The password is rehashed only when the
/// patch carries one; otherwise the stored hash is written back as-is.
pub async fn update_profile(
    users: &dyn UserStore,
    user: &User,
    req: UpdateProfileRequest,
) -> Result<User, ApiError> {
    let name = match req.name.as_deref() {
        Some(n) => clean_name(n)?,
        None => user.name.clone(),
    };
    let email = match req.email.as_deref() {
        Some(e) => clean_email(e)?,
        None => user.email.clone(),
    };
    let password_hash = match req.password {
        Some(p) => {
            check_password(&p)?;
            password::hash(p).await?
        }
        None => user.password_hash.clone(),
    };

    users
        .update_profile(
            user.id,
            ProfileUpdate {
                name,
                email,
                password_hash,
            },
        )
        .await?
        .ok_or(ApiError::Unauthorized)
}
