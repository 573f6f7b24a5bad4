//! User Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::{Role, User};

const SELECT_USER: &str = "SELECT *, <string>id AS id FROM user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn key_of(id: &str) -> String {
        id.strip_prefix("user:").unwrap_or(id).to_string()
    }

    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query(format!("{SELECT_USER} ORDER BY username"))
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let key = Self::key_of(id);
        let users: Vec<User> = self
            .base
            .db()
            .query(format!("{SELECT_USER} WHERE id = type::thing('user', $key)"))
            .bind(("key", key))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query(format!("{SELECT_USER} WHERE username = $username"))
            .bind(("username", username.to_string()))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a user; the caller supplies the password hash
    pub async fn create(
        &self,
        username: String,
        email: String,
        password_hash: String,
        role: Role,
    ) -> RepoResult<User> {
        if username.trim().is_empty() {
            return Err(RepoError::Validation("username is required".into()));
        }
        if self.find_by_username(&username).await?.is_some() {
            return Err(RepoError::Duplicate(format!("username {}", username)));
        }

        let user = User {
            id: None,
            username,
            email,
            password_hash,
            role,
            is_active: true,
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        };

        let key = Uuid::new_v4().simple().to_string();
        self.base
            .db()
            .query("CREATE type::thing('user', $key) CONTENT $data RETURN NONE")
            .bind(("key", key.clone()))
            .bind(("data", user))
            .await?
            .check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update selected fields; the caller hashes any new password
    pub async fn update(
        &self,
        id: &str,
        email: Option<String>,
        password_hash: Option<String>,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> RepoResult<User> {
        let key = Self::key_of(id);

        let mut set_parts: Vec<&str> = Vec::new();
        if email.is_some() { set_parts.push("email = $email"); }
        if password_hash.is_some() { set_parts.push("password_hash = $password_hash"); }
        if role.is_some() { set_parts.push("role = $role"); }
        if is_active.is_some() { set_parts.push("is_active = $is_active"); }

        if set_parts.is_empty() {
            return self
                .find_by_id(&key)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)));
        }

        let query_str = format!(
            "UPDATE type::thing('user', $key) SET {} RETURN NONE",
            set_parts.join(", ")
        );
        let mut query = self.base.db().query(query_str).bind(("key", key.clone()));
        if let Some(v) = email { query = query.bind(("email", v)); }
        if let Some(v) = password_hash { query = query.bind(("password_hash", v)); }
        if let Some(v) = role { query = query.bind(("role", v)); }
        if let Some(v) = is_active { query = query.bind(("is_active", v)); }

        query.await?.check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let existing = self.find_by_id(id).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound(format!("User {} not found", id)));
        }
        let key = Self::key_of(id);
        self.base
            .db()
            .query("DELETE type::thing('user', $key)")
            .bind(("key", key))
            .await?
            .check()?;
        Ok(())
    }
}
