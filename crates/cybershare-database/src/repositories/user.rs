//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use cybershare_core::error::{AppError, ErrorKind};
use cybershare_core::result::AppResult;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_entity::user::{CreateUser, User, UserProfile, UserRole, UserStatus};

use super::{db_error, unique_violation};

const PROFILE_SELECT: &str = "SELECT u.*, \
    (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id) AS followers_count, \
    (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count, \
    (SELECT COUNT(*) FROM posts p WHERE p.author_id = u.id AND p.status = 'published') AS posts_count \
    FROM users u";

/// Optional filters for the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Substring of username, display name or email.
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
}

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by username"))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))
    }

    /// Whether a username is already registered.
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check username"))
    }

    /// Whether an email address is already registered.
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check email"))
    }

    /// Load a user together with follower, following and post counts.
    pub async fn find_profile_by_username(&self, username: &str) -> AppResult<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "{PROFILE_SELECT} WHERE LOWER(u.username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load user profile"))
    }

    /// Load a profile by id.
    pub async fn find_profile_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(&format!("{PROFILE_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load user profile"))
    }

    /// Active users ranked by follower count.
    pub async fn top_authors(&self, limit: i64) -> AppResult<Vec<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "{PROFILE_SELECT} WHERE u.status = 'active' \
             ORDER BY followers_count DESC, posts_count DESC, u.created_at ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load top authors"))
    }

    /// Search users by username or display name.
    pub async fn search(&self, query: &str, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let pattern = format!("%{query}%");

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE username ILIKE $1 OR display_name ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count search results"))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username ILIKE $1 OR display_name ILIKE $1 \
             ORDER BY username ASC LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to search users"))?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    /// List users for the admin console, newest first.
    pub async fn find_filtered(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let pattern = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("%{}%", s.trim()));
        let clause = "($1::text IS NULL OR username ILIKE $1 OR display_name ILIKE $1 OR email ILIKE $1) \
             AND ($2::user_status IS NULL OR status = $2) \
             AND ($3::user_role IS NULL OR role = $3)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {clause}"))
            .bind(&pattern)
            .bind(filter.status)
            .bind(filter.role)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users WHERE {clause} ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(&pattern)
        .bind(filter.status)
        .bind(filter.role)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list users"))?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, display_name, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.display_name)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(c) if c.contains("username") => {
                AppError::conflict(format!("Username '{}' is already taken", data.username))
            }
            Some(c) if c.contains("email") => AppError::conflict("Email is already in use"),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    /// Update profile fields. `None` keeps the stored value.
    pub async fn update_profile(
        &self,
        id: Uuid,
        display_name: Option<&str>,
        bio: Option<&str>,
        about: Option<&str>,
        avatar_url: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET display_name = COALESCE($2, display_name), \
                              bio = COALESCE($3, bio), \
                              about = COALESCE($4, about), \
                              avatar_url = COALESCE($5, avatar_url), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(display_name)
        .bind(bio)
        .bind(about)
        .bind(avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user"))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Replace the password hash.
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update password"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }

    /// Set the account status.
    pub async fn update_status(&self, id: Uuid, status: UserStatus) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user status"))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Set the platform role.
    pub async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user role"))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }
}
