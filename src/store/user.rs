use sqlx::MySqlPool;

use crate::model::role::Role;
use crate::model::user::User;
use crate::models::UserSql;

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub department: Option<&'a str>,
    pub role: Role,
}

pub struct UserStore<'a> {
    pool: &'a MySqlPool,
}

impl<'a> UserStore<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: u64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, department, role_id
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn active(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, department, role_id
            FROM users
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(self.pool)
        .await
    }

    pub async fn credentials(&self, username: &str) -> Result<Option<UserSql>, sqlx::Error> {
        sqlx::query_as::<_, UserSql>(
            r#"
            SELECT id, username, password, role_id, is_active
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
        )
        .bind(username)
        .fetch_one(self.pool)
        .await
    }

    pub async fn create(&self, new: NewUser<'_>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, name, department, role_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.username)
        .bind(new.password_hash)
        .bind(new.name)
        .bind(new.department)
        .bind(new.role.id())
        .execute(self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    pub async fn touch_login(&self, user_id: u64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
