//! # User Store
//!
//! Back-office accounts (`users`) and the signed-in user (`currentUser`).
//!
//! ## Sign-in
//! ```text
//! login(email, password)
//!     │
//!     ├── no active user with that email ──► Ok(None)
//!     ├── argon2 verify fails            ──► Ok(None)
//!     ▼
//! currentUser = profile (no password hash) ──► Ok(Some(profile))
//! ```
//!
//! An install always has at least one account: whenever the user list is
//! empty the default administrator is created.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use till_core::{User, UserPatch, UserProfile, UserRole};

use crate::error::{DbError, DbResult};
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::{CollectionStore, SingletonStore};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@pos.local";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Clone)]
pub struct UserStore {
    users: CollectionStore<User>,
    current: SingletonStore<Option<UserProfile>>,
}

impl UserStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let users = CollectionStore::open(storage.clone(), keys::USERS, "User").await?;
        let current = SingletonStore::open(storage, keys::CURRENT_USER).await?;
        let store = UserStore { users, current };
        store.ensure_admin(Utc::now()).await?;
        Ok(store)
    }

    pub fn users(&self) -> &CollectionStore<User> {
        &self.users
    }

    pub fn by_email(&self, email: &str) -> Option<User> {
        self.users.find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Creates an account. Emails are unique, ignoring case.
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: UserRole,
        password: &str,
        now: DateTime<Utc>,
    ) -> DbResult<UserProfile> {
        if self.by_email(email).is_some() {
            return Err(DbError::duplicate("email", email));
        }
        let user = self
            .users
            .add(User {
                id: till_core::new_id(),
                email: email.trim().to_string(),
                name: name.to_string(),
                role,
                active: true,
                password_hash: hash_password(password)?,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(user = %user.id, role = ?user.role, "User created");
        Ok(user.profile())
    }

    pub async fn update_user(&self, id: &str, patch: UserPatch) -> DbResult<UserProfile> {
        if let Some(email) = &patch.email {
            if self.users.find(|u| u.id != id && u.email.eq_ignore_ascii_case(email)).is_some() {
                return Err(DbError::duplicate("email", email));
            }
        }
        Ok(self.users.update(id, patch).await?.profile())
    }

    pub async fn set_password(&self, id: &str, password: &str) -> DbResult<()> {
        let hash = hash_password(password)?;
        self.users
            .update_with(id, |user| {
                user.password_hash = hash;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Signs in. Unknown emails, inactive accounts and wrong passwords all
    /// give `Ok(None)` and leave the current user untouched.
    pub async fn login(&self, email: &str, password: &str) -> DbResult<Option<UserProfile>> {
        let Some(user) = self.by_email(email.trim()).filter(|u| u.active) else {
            warn!(email = %email, "Login rejected");
            return Ok(None);
        };
        if !verify_password(password, &user.password_hash) {
            warn!(email = %email, "Login rejected");
            return Ok(None);
        }

        let profile = user.profile();
        self.current.set(Some(profile.clone())).await?;
        info!(user = %profile.id, "Logged in");
        Ok(Some(profile))
    }

    pub async fn logout(&self) -> DbResult<()> {
        self.current.clear().await
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.current.get()
    }

    /// Whether the signed-in user may use a feature gated at `required`.
    /// Nobody signed in means no.
    pub fn has_permission(&self, required: UserRole) -> bool {
        self.current_user()
            .map_or(false, |u| u.active && u.role.allows(required))
    }

    pub async fn reload(&self) -> DbResult<()> {
        self.users.reload().await?;
        self.current.reload().await?;
        self.ensure_admin(Utc::now()).await
    }

    async fn ensure_admin(&self, now: DateTime<Utc>) -> DbResult<()> {
        if !self.users.is_empty() {
            return Ok(());
        }
        self.users
            .add(User {
                id: "1".into(),
                email: DEFAULT_ADMIN_EMAIL.into(),
                name: "Admin User".into(),
                role: UserRole::Admin,
                active: true,
                password_hash: hash_password(DEFAULT_ADMIN_PASSWORD)?,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(email = DEFAULT_ADMIN_EMAIL, "Default administrator created");
        Ok(())
    }
}

fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Credentials(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
