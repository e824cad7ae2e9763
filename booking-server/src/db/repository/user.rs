//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Role, User};
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "user";

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

    /// Find all users
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY username")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = parse_id(TABLE, id)?;
        let user: Option<User> = self.base.db().select(rid).await?;
        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user; hashes the password before persisting
    pub async fn create(&self, username: String, password: &str, role: Role) -> RepoResult<User> {
        if self.find_by_username(&username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let hash_pass = User::hash_password(password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        // hash_pass is skip_serializing on the model, so bind it explicitly
        // instead of going through CREATE CONTENT
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    username = $username,
                    hashPass = $hash_pass,
                    role = $role,
                    createdAt = $created_at
                RETURN AFTER"#,
            )
            .bind(("username", username))
            .bind(("hash_pass", hash_pass))
            .bind(("role", role))
            .bind(("created_at", Utc::now().timestamp_millis()))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Hard delete a user, returning the removed record
    pub async fn delete(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = parse_id(TABLE, id)?;
        let deleted: Option<User> = self.base.db().delete(rid).await?;
        Ok(deleted)
    }
}
