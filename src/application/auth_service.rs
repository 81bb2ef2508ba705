use crate::data::collection::Collection;
use crate::domain::error::DomainError;
use crate::domain::repository::KeyValueStore;
use crate::domain::user::{
    AuthSession, ChangePasswordRequest, LoginRequest, ProfileChanges, Session, SignupRequest,
    User, UserProfile,
};
use crate::infrastructure::security::{
    TokenClaims, generate_token, hash_password, validate_token, verify_password,
};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

pub const USERS_KEY: &str = "users";
pub const SESSIONS_KEY: &str = "sessions";
pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService<S: KeyValueStore + ?Sized> {
    users: Collection<User, S>,
    sessions: Collection<Session, S>,
    jwt_secret: String,
    token_ttl_secs: u64,
}

impl<S: KeyValueStore + ?Sized> AuthService<S> {
    pub fn new(store: Arc<S>, jwt_secret: String, token_ttl_secs: u64) -> Self {
        Self {
            users: Collection::new(store.clone(), USERS_KEY),
            sessions: Collection::new(store, SESSIONS_KEY),
            jwt_secret,
            token_ttl_secs,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn signup(&self, req: SignupRequest) -> Result<AuthSession> {
        trace!("Starting signup");

        if self.find_by_email(&req.email).await?.is_some() {
            warn!(email = %req.email, "User already exists");
            return Err(DomainError::Conflict("User already exists".to_string()).into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: req.email,
            name: req.name,
            password_hash,
            created_at: Utc::now().to_rfc3339(),
            avatar: None,
            bio: None,
            phone: None,
            timezone: None,
            preferences: None,
        };

        // Re-checked under the write lock: a concurrent signup may have won.
        let user = self
            .users
            .checked_modify(|users| {
                if users.iter().any(|u| u.email == user.email) {
                    return Err(DomainError::Conflict("User already exists".to_string()));
                }
                users.push(user.clone());
                Ok(user)
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "User signed up");
        self.open_session(&user).await
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession> {
        trace!("Starting login");

        let user = self.find_by_email(&req.email).await?.ok_or_else(|| {
            warn!(email = %req.email, "User not found during login");
            DomainError::Unauthorized(INVALID_CREDENTIALS.to_string())
        })?;

        if !self.password_matches(&req.password, &user)? {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }

        info!(user_id = %user.id, email = %user.email, "Login successful");
        self.open_session(&user).await
    }

    /// Ends the session; tokens issued for it stop authenticating.
    #[instrument(skip(self))]
    pub async fn logout(&self, session_id: &str) -> Result<bool> {
        let removed = self
            .sessions
            .try_modify(|sessions| {
                let before = sessions.len();
                sessions.retain(|s| s.id != session_id);
                (sessions.len() < before).then_some(())
            })
            .await?
            .is_some();
        info!(session_id = session_id, removed = removed, "Logout");
        Ok(removed)
    }

    /// Resolves a bearer token to the identity it was issued for.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<TokenClaims> {
        let claims = validate_token(token, &self.jwt_secret).map_err(|e| {
            warn!(error = %e, "Token validation failed");
            DomainError::Unauthorized("Invalid or expired token".to_string())
        })?;

        let now = Utc::now().timestamp();
        let active = self.sessions.all().await?.iter().any(|s| {
            s.id == claims.session_id && s.user_id == claims.user_id && !s.is_expired(now)
        });
        if !active {
            warn!(session_id = %claims.session_id, "Token refers to an ended session");
            return Err(DomainError::Unauthorized("Session has ended".to_string()).into());
        }

        debug!(user_id = %claims.user_id, "Token authenticated");
        Ok(claims)
    }

    #[instrument(skip(self))]
    pub async fn current_user(&self, user_id: &str) -> Result<UserProfile> {
        Ok(self.find_by_id(user_id).await?.profile())
    }

    #[instrument(skip(self, changes))]
    pub async fn update_profile(&self, user_id: &str, changes: ProfileChanges) -> Result<UserProfile> {
        let profile = self
            .users
            .checked_modify(|users| {
                if let Some(email) = &changes.email {
                    if users.iter().any(|u| u.id != user_id && &u.email == email) {
                        return Err(DomainError::Conflict("Email is already in use".to_string()));
                    }
                }
                let user = users
                    .iter_mut()
                    .find(|u| u.id == user_id)
                    .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;
                user.apply(changes);
                Ok(user.profile())
            })
            .await?;

        info!(user_id = user_id, "Profile updated");
        Ok(profile)
    }

    #[instrument(skip(self, req))]
    pub async fn change_password(&self, user_id: &str, req: ChangePasswordRequest) -> Result<()> {
        if req.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "New password must be at least {} characters",
                MIN_PASSWORD_LEN
            ))
            .into());
        }

        let user = self.find_by_id(user_id).await?;
        if !self.password_matches(&req.current_password, &user)? {
            warn!(user_id = user_id, "Current password mismatch");
            return Err(
                DomainError::Validation("Current password is incorrect".to_string()).into(),
            );
        }

        let password_hash = hash_password(&req.new_password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        self.users
            .checked_modify(|users| {
                let user = users
                    .iter_mut()
                    .find(|u| u.id == user_id)
                    .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;
                user.password_hash = password_hash;
                Ok(())
            })
            .await?;

        info!(user_id = user_id, "Password changed");
        Ok(())
    }

    async fn open_session(&self, user: &User) -> Result<AuthSession> {
        let now = Utc::now();
        let ttl = i64::try_from(self.token_ttl_secs).unwrap_or(i64::MAX);
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            created_at: now.to_rfc3339(),
            expires_at: now.timestamp().saturating_add(ttl),
        };

        let access_token =
            generate_token(&user.id, &session.id, &self.jwt_secret, self.token_ttl_secs).map_err(
                |e| {
                    error!(error = %e, "Failed to generate token");
                    DomainError::Internal(format!("Failed to generate token: {}", e))
                },
            )?;

        // Expired rows are dropped whenever a new session is written
        let pruned = self
            .sessions
            .modify(|sessions| {
                let before = sessions.len();
                sessions.retain(|s| !s.is_expired(now.timestamp()));
                let pruned = before - sessions.len();
                sessions.push(session.clone());
                pruned
            })
            .await?;
        debug!(user_id = %user.id, session_id = %session.id, pruned, "Session opened");

        Ok(AuthSession {
            user: user.profile(),
            access_token,
        })
    }

    fn password_matches(&self, password: &str, user: &User) -> Result<bool> {
        let matches = verify_password(password, &user.password_hash).map_err(|e| {
            error!(user_id = %user.id, error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;
        Ok(matches)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.all().await?.into_iter().find(|u| u.email == email))
    }

    async fn find_by_id(&self, user_id: &str) -> Result<User> {
        self.users
            .all()
            .await?
            .into_iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| DomainError::NotFound("User not found".to_string()).into())
    }
}
