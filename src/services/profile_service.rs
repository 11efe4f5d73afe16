use crate::dto::profile_dto::UpdateProfilePayload;
use crate::error::Result;
use crate::models::user_settings::{Theme, UserSettings};
use sqlx::PgPool;
use uuid::Uuid;

const SETTINGS_COLUMNS: &str =
    "id, user_id, full_name, email, avatar_url, theme, language, created_at, updated_at";

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<UserSettings>> {
        let query = format!(
            "SELECT {} FROM user_settings WHERE user_id = $1",
            SETTINGS_COLUMNS
        );
        let settings = sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(settings)
    }

    pub async fn upsert(&self, user_id: Uuid, payload: UpdateProfilePayload) -> Result<UserSettings> {
        let theme = payload.theme.unwrap_or(Theme::Light);
        let language = payload.language.unwrap_or_else(|| "en".to_string());

        let query = format!(
            r#"
            INSERT INTO user_settings (user_id, full_name, email, avatar_url, theme, language)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                email = EXCLUDED.email,
                avatar_url = EXCLUDED.avatar_url,
                theme = EXCLUDED.theme,
                language = EXCLUDED.language,
                updated_at = NOW()
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );

        let settings = sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .bind(payload.full_name.trim())
            .bind(payload.email)
            .bind(payload.avatar_url)
            .bind(theme.as_str())
            .bind(language)
            .fetch_one(&self.pool)
            .await?;

        Ok(settings)
    }
}
