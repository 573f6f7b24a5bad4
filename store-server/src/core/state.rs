//! Server state
//!
//! [`ServerState`] holds shared references to every service the
//! handlers need. Collaborators are constructed here from [`Config`]
//! and passed down explicitly; nothing reaches for ambient globals.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtService, hash_password};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::UserRepository;
use crate::services::MediaService;
use crate::utils::AppResult;
use shared::models::Role;

/// Shared server state, cheap to clone (Arc'd services)
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration (immutable after startup)
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT token service
    pub jwt_service: Arc<JwtService>,
    /// Media host collaborator
    pub media: Arc<MediaService>,
}

impl ServerState {
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        media: Arc<MediaService>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            media,
        }
    }

    /// Initialize server state
    ///
    /// 1. Ensure the work directory structure exists
    /// 2. Open the embedded database and apply schema definitions
    /// 3. Seed the first admin account if the user table is empty
    /// 4. Construct the JWT and media services from config
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be initialized or the first admin
    /// account cannot be seeded.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("store.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        seed_initial_admin(
            db_service.db.clone(),
            &config.admin_username,
            &config.admin_password,
        )
        .await
        .expect("Failed to seed initial admin account");

        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let media = Arc::new(MediaService::new(config.media.clone()));

        Self::new(config.clone(), db_service.db, jwt_service, media)
    }

    /// Get the database handle
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// Get the JWT service
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Get the media service
    pub fn media_service(&self) -> Arc<MediaService> {
        self.media.clone()
    }
}

/// Create the first admin account while the user table is empty
///
/// Runs on every startup and is a no-op once any user exists, so a
/// fresh install always has a way to log in and an established one is
/// never touched.
pub async fn seed_initial_admin(
    db: Surreal<Db>,
    username: &str,
    password: &str,
) -> AppResult<()> {
    let users = UserRepository::new(db);
    if !users.find_all().await?.is_empty() {
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    users
        .create(
            username.to_string(),
            format!("{username}@localhost"),
            password_hash,
            Role::Admin,
        )
        .await?;
    tracing::warn!(
        username,
        "Seeded initial admin account; change its password after first login"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_seed_creates_admin_on_empty_table() {
        let db = DbService::memory().await.expect("in-memory db");

        seed_initial_admin(db.db.clone(), "admin", "changeme8")
            .await
            .unwrap();

        let users = UserRepository::new(db.db);
        let admin = users
            .find_by_username("admin")
            .await
            .unwrap()
            .expect("seeded admin");
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.is_active);
        assert!(verify_password("changeme8", &admin.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_seed_is_noop_once_any_user_exists() {
        let db = DbService::memory().await.expect("in-memory db");
        seed_initial_admin(db.db.clone(), "admin", "changeme8")
            .await
            .unwrap();

        // Different credentials on a later startup must not add accounts
        seed_initial_admin(db.db.clone(), "other", "password123")
            .await
            .unwrap();

        let users = UserRepository::new(db.db);
        assert_eq!(users.find_all().await.unwrap().len(), 1);
        assert!(users.find_by_username("other").await.unwrap().is_none());
    }
}
