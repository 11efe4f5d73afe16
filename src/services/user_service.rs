use crate::error::Result;
use crate::models::telegram_user::TelegramUser;
use crate::utils::telegram_auth::WebAppUser;
use sqlx::PgPool;

const USER_COLUMNS: &str =
    "id, telegram_id, username, first_name, last_name, photo_url, language_code, created_at, updated_at";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or refreshes the row for a verified Telegram user.
    pub async fn upsert(&self, user: &WebAppUser) -> Result<TelegramUser> {
        let first_name = if user.first_name.trim().is_empty() {
            "Unknown"
        } else {
            user.first_name.as_str()
        };

        let query = format!(
            r#"
            INSERT INTO telegram_users (telegram_id, username, first_name, last_name, photo_url, language_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (telegram_id) DO UPDATE SET
                username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                photo_url = EXCLUDED.photo_url,
                language_code = EXCLUDED.language_code,
                updated_at = NOW()
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, TelegramUser>(&query)
            .bind(user.id)
            .bind(&user.username)
            .bind(first_name)
            .bind(&user.last_name)
            .bind(&user.photo_url)
            .bind(&user.language_code)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    /// Existing row for the caller, or a freshly upserted one.
    pub async fn ensure(&self, user: &WebAppUser) -> Result<TelegramUser> {
        match self.get_by_telegram_id(user.id).await? {
            Some(existing) => Ok(existing),
            None => self.upsert(user).await,
        }
    }

    pub async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<TelegramUser>> {
        let query = format!(
            "SELECT {} FROM telegram_users WHERE telegram_id = $1",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, TelegramUser>(&query)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
