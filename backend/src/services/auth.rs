//! Authentication service for login, token management and passwords

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::config::{BootstrapConfig, Config};
use crate::error::{AppError, AppResult};
use shared::access::{Identity, ADMINISTRATOR};
use shared::models::ChangePassword;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub name: String,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// The identity these claims describe, if the subject is a valid id
    pub fn identity(self) -> Option<Identity> {
        let user_id = Uuid::parse_str(&self.sub).ok()?;
        Some(Identity {
            user_id,
            name: self.name,
            roles: self.roles,
        })
    }
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    user_name: String,
    password_hash: String,
}

/// Decode and validate an access token
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized {
        message: format!("Invalid token: {}", e),
    })
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Hash a refresh token for storage
fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Role names held by a user
pub async fn roles_of<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> AppResult<Vec<String>> {
    let roles = sqlx::query_scalar::<_, String>(
        r#"
        SELECT r.name
        FROM roles r
        JOIN user_roles ur ON ur.role_id = r.id
        WHERE ur.user_id = $1
        ORDER BY r.name
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(roles)
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Authenticate with a user name or email address and a password
    pub async fn login(&self, login: &str, password: &str) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, user_name, password_hash
            FROM users
            WHERE user_name = $1 OR email = $1
            "#,
        )
        .bind(login.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::warn!("Failed login for {}", user.user_name);
            return Err(AppError::InvalidCredentials);
        }

        let roles = roles_of(&self.db, user.id).await?;
        let tokens = self.generate_tokens(user.id, &user.user_name, roles)?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        tracing::info!("User {} logged in", user.user_name);
        Ok(tokens)
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// The presented token is revoked, so each refresh token works once.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);
        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE token_hash = $1
              AND expires_at > NOW()
              AND revoked_at IS NULL
            RETURNING user_id
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid or expired refresh token".to_string(),
        })?;

        let user_name = sqlx::query_scalar::<_, String>("SELECT user_name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let roles = roles_of(&mut *tx, user_id).await?;

        let tokens = self.generate_tokens(user_id, &user_name, roles)?;
        self.insert_refresh_token(&mut *tx, user_id, &tokens.refresh_token)
            .await?;

        tx.commit().await?;
        Ok(tokens)
    }

    /// Revoke a refresh token
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(hash_token(refresh_token))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Change the caller's own password after checking the current one
    pub async fn change_password(&self, identity: &Identity, input: &ChangePassword) -> AppResult<()> {
        let current_hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
                .bind(identity.user_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let valid = verify(&input.current_password, &current_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::validation(
                "current_password",
                "Current password is incorrect",
            ));
        }

        let new_hash = hash_password(&input.new_password)?;
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&new_hash)
            .bind(identity.user_id)
            .execute(&mut *tx)
            .await?;

        // Outstanding sessions end with the old password
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(identity.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("User {} changed password", identity.name);
        Ok(())
    }

    /// Create the configured administrator when no user exists yet
    pub async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<()> {
        let (Some(user_name), Some(email), Some(password)) = (
            bootstrap.admin_user_name.as_deref(),
            bootstrap.admin_email.as_deref(),
            bootstrap.admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(());
        }

        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO roles (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(ADMINISTRATOR)
        .fetch_one(&mut *tx)
        .await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (user_name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_name)
        .bind(email)
        .bind(hash_password(password)?)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!("Created bootstrap administrator {}", user_name);
        Ok(())
    }

    /// Generate access and refresh tokens
    fn generate_tokens(
        &self,
        user_id: Uuid,
        user_name: &str,
        roles: Vec<String>,
    ) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: user_id.to_string(),
            name: user_name.to_string(),
            roles,
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Opaque; only its hash is stored
        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.insert_refresh_token(&self.db, user_id, token).await
    }

    async fn insert_refresh_token<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
        token: &str,
    ) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(executor)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> AuthService {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/ims_test")
            .unwrap();
        AuthService {
            db,
            jwt_secret: "test-secret".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 86400,
        }
    }

    #[test]
    fn test_hash_token_is_sha256_hex() {
        let hashed = hash_token("abc");
        assert_eq!(hashed.len(), 64);
        assert_eq!(
            hashed,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_access_token_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();
        let tokens = service
            .generate_tokens(user_id, "sara", vec![ADMINISTRATOR.to_string()])
            .unwrap();

        assert_eq!(tokens.token_type, "Bearer");
        assert_ne!(tokens.refresh_token, tokens.access_token);

        let identity = decode_access_token(&tokens.access_token, "test-secret")
            .unwrap()
            .identity()
            .unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.name, "sara");
        assert!(identity.is_administrator());
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let tokens = service()
            .generate_tokens(Uuid::new_v4(), "sara", vec![])
            .unwrap();
        let err = decode_access_token(&tokens.access_token, "another-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_claims_with_bad_subject_have_no_identity() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            name: "sara".to_string(),
            roles: vec![],
            exp: 0,
            iat: 0,
        };
        assert!(claims.identity().is_none());
    }
}
