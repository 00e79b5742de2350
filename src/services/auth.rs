use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::{
    config::auth::AuthConfig,
    entity::user::{self, Role},
    errors::{ApiError, ApiResult},
    repositories::{self, session::NewSession},
};

/// 64 bytes = 512 bits of entropy before hex encoding.
pub const TOKEN_BYTES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn login(
    db: &DatabaseConnection,
    config: &AuthConfig,
    username: &str,
    password: &str,
    client: ClientMeta,
) -> ApiResult<LoginOutcome> {
    let Some(admin) =
        repositories::user::find_by_name_and_role(db, username, Role::Admin).await?
    else {
        warn!(username, "Login attempt for unknown admin");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_secret(password, &admin.secret).await? {
        warn!(username, "Login attempt with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = generate_token();
    let expires_at = Utc::now() + Duration::days(config.session_ttl_days);
    repositories::session::save(
        db,
        NewSession {
            user_id: admin.id,
            session_token: token.clone(),
            ip_address: client.ip_address,
            user_agent: client.user_agent,
            expires_at,
        },
    )
    .await?;

    info!(user_id = admin.id, %expires_at, "Admin session created");
    Ok(LoginOutcome { token, expires_at })
}

/// Resolves the owner of `token`. Expired sessions are rejected but kept.
pub async fn authenticate(
    db: &DatabaseConnection,
    token: Option<&str>,
    require_role: Option<Role>,
) -> ApiResult<user::Model> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)?;

    let session = repositories::session::find_by_token(db, token)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    if session.is_expired_at(Utc::now()) {
        return Err(ApiError::SessionExpired);
    }

    let user = repositories::user::find_by_id(db, session.user_id)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    if let Some(role) = require_role {
        if !user.has_role(role) {
            return Err(ApiError::Forbidden);
        }
    }
    Ok(user)
}

/// Inserts an admin named `name` unless a user with that name exists.
/// Returns whether a user was created.
pub async fn ensure_admin(db: &DatabaseConnection, name: &str, password: &str) -> ApiResult<bool> {
    if repositories::user::exist_by_name(db, name).await? {
        return Ok(false);
    }
    let hash = hash_secret(password, bcrypt::DEFAULT_COST).await?;
    repositories::user::save(db, name, Role::Admin.as_str(), hash).await?;
    info!(name, "Seeded admin user");
    Ok(true)
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// bcrypt runs on the blocking pool; it is deliberately slow.
pub async fn hash_secret(password: &str, cost: u32) -> ApiResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

async fn verify_secret(password: &str, hash: &str) -> ApiResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password verification task failed: {e}")))?;
    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            warn!(error = %e, "Stored secret is not a valid bcrypt hash");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{memory_db, seed_user};

    fn client() -> ClientMeta {
        ClientMeta {
            ip_address: "10.0.0.7".to_string(),
            user_agent: "curl/8.0".to_string(),
        }
    }

    #[test]
    fn tokens_are_long_unique_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn login_then_authenticate_resolves_the_same_admin() {
        let db = memory_db().await;
        let admin_id = seed_user(&db, "admin", "hunter2", "admin").await;

        let outcome = login(&db, &AuthConfig::default(), "admin", "hunter2", client())
            .await
            .unwrap();
        let days = (outcome.expires_at - Utc::now()).num_days();
        assert!((89..=90).contains(&days));

        let user = authenticate(&db, Some(&outcome.token), Some(Role::Admin))
            .await
            .unwrap();
        assert_eq!(user.id, admin_id);

        let sessions = repositories::session::find_by_user_id(&db, admin_id).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].ip_address, "10.0.0.7");
        assert_eq!(sessions[0].user_agent, "curl/8.0");
    }

    #[tokio::test]
    async fn wrong_password_creates_no_session() {
        let db = memory_db().await;
        let admin_id = seed_user(&db, "admin", "hunter2", "admin").await;

        let err = login(&db, &AuthConfig::default(), "admin", "wrong", client())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));

        let sessions = repositories::session::find_by_user_id(&db, admin_id).await.unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn non_admin_users_cannot_log_in() {
        let db = memory_db().await;
        seed_user(&db, "viewer", "pw", "other").await;

        let err = login(&db, &AuthConfig::default(), "viewer", "pw", client())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn concurrent_logins_keep_every_session_valid() {
        let db = memory_db().await;
        seed_user(&db, "admin", "pw", "admin").await;
        let config = AuthConfig::default();

        let first = login(&db, &config, "admin", "pw", client()).await.unwrap();
        let second = login(&db, &config, "admin", "pw", client()).await.unwrap();
        assert_ne!(first.token, second.token);
        assert!(authenticate(&db, Some(&first.token), None).await.is_ok());
        assert!(authenticate(&db, Some(&second.token), None).await.is_ok());
    }

    #[tokio::test]
    async fn authenticate_rejects_missing_unknown_and_expired_tokens() {
        let db = memory_db().await;
        let admin_id = seed_user(&db, "admin", "pw", "admin").await;

        assert!(matches!(
            authenticate(&db, None, None).await.unwrap_err(),
            ApiError::MissingToken
        ));
        assert!(matches!(
            authenticate(&db, Some("  "), None).await.unwrap_err(),
            ApiError::MissingToken
        ));
        assert!(matches!(
            authenticate(&db, Some("deadbeef"), Some(Role::Admin))
                .await
                .unwrap_err(),
            ApiError::InvalidToken
        ));

        repositories::session::save(
            &db,
            NewSession {
                user_id: admin_id,
                session_token: "expired-token".to_string(),
                ip_address: "unknown".to_string(),
                user_agent: "unknown".to_string(),
                expires_at: Utc::now() - Duration::minutes(1),
            },
        )
        .await
        .unwrap();
        for role in [None, Some(Role::Admin)] {
            assert!(matches!(
                authenticate(&db, Some("expired-token"), role).await.unwrap_err(),
                ApiError::SessionExpired
            ));
        }
        // Expired sessions stay in the store
        assert!(repositories::session::find_by_token(&db, "expired-token")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn role_mismatch_is_forbidden() {
        let db = memory_db().await;
        let viewer_id = seed_user(&db, "viewer", "pw", "other").await;
        repositories::session::save(
            &db,
            NewSession {
                user_id: viewer_id,
                session_token: "viewer-token".to_string(),
                ip_address: "unknown".to_string(),
                user_agent: "unknown".to_string(),
                expires_at: Utc::now() + Duration::days(1),
            },
        )
        .await
        .unwrap();

        assert!(matches!(
            authenticate(&db, Some("viewer-token"), Some(Role::Admin))
                .await
                .unwrap_err(),
            ApiError::Forbidden
        ));
        let user = authenticate(&db, Some("viewer-token"), None).await.unwrap();
        assert_eq!(user.id, viewer_id);
    }

    #[tokio::test]
    async fn ensure_admin_only_seeds_once() {
        let db = memory_db().await;
        assert!(ensure_admin(&db, "root", "pw").await.unwrap());
        assert!(!ensure_admin(&db, "root", "pw").await.unwrap());
    }
}
