//! Sign-in and role checks for back-office features.

use till_core::{UserProfile, UserRole};
use till_db::Database;

use crate::error::{ApiError, ErrorCode};

/// Signs in. Every kind of bad credential gives the same `UNAUTHORIZED`
/// error.
pub async fn login(db: &Database, email: &str, password: &str) -> Result<UserProfile, ApiError> {
    db.users()
        .login(email, password)
        .await?
        .ok_or_else(|| ApiError::new(ErrorCode::Unauthorized, "Invalid email or password"))
}

pub async fn logout(db: &Database) -> Result<(), ApiError> {
    Ok(db.users().logout().await?)
}

/// The signed-in user, when their role allows `required`.
pub fn require_role(db: &Database, required: UserRole) -> Result<UserProfile, ApiError> {
    let user = db
        .users()
        .current_user()
        .ok_or_else(|| ApiError::new(ErrorCode::Unauthorized, "Not signed in"))?;
    if !db.users().has_permission(required) {
        return Err(ApiError::new(
            ErrorCode::Forbidden,
            format!("{} may not use this feature", user.name),
        ));
    }
    Ok(user)
}
