use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::telegram_user::TelegramUser;
use crate::models::user_settings::{Theme, UserSettings};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    pub theme: Option<Theme>,
    #[validate(length(min = 2, max = 16))]
    pub language: Option<String>,
}

impl UpdateProfilePayload {
    pub fn normalize(&mut self) {
        self.full_name = self.full_name.trim().to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub theme: String,
    pub language: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileResponse {
    /// Stored settings win; otherwise fall back to what Telegram told us.
    pub fn from_parts(user: &TelegramUser, settings: Option<UserSettings>) -> Self {
        match settings {
            Some(s) => Self {
                telegram_id: user.telegram_id,
                username: user.username.clone(),
                full_name: s.full_name,
                email: s.email,
                avatar_url: s.avatar_url.or_else(|| user.photo_url.clone()),
                theme: s.theme,
                language: s.language,
                updated_at: Some(s.updated_at),
            },
            None => Self {
                telegram_id: user.telegram_id,
                username: user.username.clone(),
                full_name: display_name(user),
                email: None,
                avatar_url: user.photo_url.clone(),
                theme: Theme::Light.as_str().to_string(),
                language: user
                    .language_code
                    .clone()
                    .unwrap_or_else(|| "en".to_string()),
                updated_at: None,
            },
        }
    }
}

fn display_name(user: &TelegramUser) -> String {
    match &user.last_name {
        Some(last) if !last.is_empty() => format!("{} {}", user.first_name, last),
        _ => user.first_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user() -> TelegramUser {
        TelegramUser {
            id: Uuid::new_v4(),
            telegram_id: 7,
            username: Some("dealer".into()),
            first_name: "Ann".into(),
            last_name: Some("Lee".into()),
            photo_url: Some("https://t.me/i/ann.jpg".into()),
            language_code: Some("ru".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn defaults_come_from_telegram_user() {
        let profile = ProfileResponse::from_parts(&user(), None);
        assert_eq!(profile.full_name, "Ann Lee");
        assert_eq!(profile.language, "ru");
        assert_eq!(profile.theme, "light");
        assert_eq!(profile.avatar_url.as_deref(), Some("https://t.me/i/ann.jpg"));
        assert!(profile.updated_at.is_none());
    }

    #[test]
    fn rejects_bad_email() {
        let payload = UpdateProfilePayload {
            full_name: "Ann".into(),
            email: Some("not-an-email".into()),
            avatar_url: None,
            theme: Some(Theme::Dark),
            language: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn whitespace_name_fails_validation() {
        let mut payload: UpdateProfilePayload =
            serde_json::from_str(r#"{"full_name":"   "}"#).unwrap();
        payload.normalize();
        assert!(payload.full_name.is_empty());
        assert!(payload.validate().is_err());
    }
}
