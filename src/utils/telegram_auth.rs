//! Telegram Mini-App init-data verification.
//!
//! Telegram signs the launch payload with a key derived from the bot token:
//! `secret = HMAC_SHA256(key = "WebAppData", msg = bot_token)` and then
//! `hash = hex(HMAC_SHA256(key = secret, msg = data_check_string))`, where the
//! check string is every field except `hash`, sorted by key and joined as
//! `key=value` lines.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const KEY_DERIVATION_LABEL: &[u8] = b"WebAppData";
const HASH_FIELD: &str = "hash";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelegramAuthError {
    #[error("bot token is empty")]
    EmptySecret,
    #[error("signing key rejected: {0}")]
    InvalidKey(String),
    #[error("init data has no hash field")]
    MissingHash,
    #[error("init data is malformed: {0}")]
    Malformed(String),
    #[error("init data signature does not match")]
    InvalidSignature,
    #[error("init data is older than the allowed age")]
    Expired,
    #[error("init data carries no user")]
    MissingUser,
    #[error("init data user is invalid: {0}")]
    InvalidUser(String),
}

impl TelegramAuthError {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            TelegramAuthError::EmptySecret | TelegramAuthError::InvalidKey(_) => {
                "server_misconfigured"
            }
            TelegramAuthError::MissingHash
            | TelegramAuthError::Malformed(_)
            | TelegramAuthError::InvalidSignature => "invalid_init_data",
            TelegramAuthError::Expired => "init_data_expired",
            TelegramAuthError::MissingUser => "missing_user",
            TelegramAuthError::InvalidUser(_) => "invalid_user",
        }
    }
}

/// The `user` object Telegram serializes as JSON inside init-data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: Option<bool>,
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub is_premium: Option<bool>,
    pub photo_url: Option<String>,
}

/// Decoded fields of an init-data string whose signature has been checked.
#[derive(Debug, Clone)]
pub struct InitData {
    fields: BTreeMap<String, String>,
}

impl InitData {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn query_id(&self) -> Option<&str> {
        self.get("query_id")
    }

    pub fn start_param(&self) -> Option<&str> {
        self.get("start_param")
    }

    pub fn auth_date(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.get("auth_date")?.parse().ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    pub fn user(&self) -> Result<WebAppUser, TelegramAuthError> {
        let raw = self.get("user").ok_or(TelegramAuthError::MissingUser)?;
        serde_json::from_str(raw).map_err(|e| TelegramAuthError::InvalidUser(e.to_string()))
    }
}

/// Holds an HMAC already keyed with the secret derived from the bot token. The
/// token itself is not retained.
#[derive(Clone)]
pub struct InitDataVerifier {
    mac: HmacSha256,
    max_age: Option<Duration>,
}

impl fmt::Debug for InitDataVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitDataVerifier")
            .field("mac", &"<redacted>")
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl InitDataVerifier {
    pub fn new(bot_token: &str) -> Result<Self, TelegramAuthError> {
        if bot_token.trim().is_empty() {
            return Err(TelegramAuthError::EmptySecret);
        }
        let secret_key = derive_secret_key(bot_token)?;
        let mac = HmacSha256::new_from_slice(&secret_key)
            .map_err(|e| TelegramAuthError::InvalidKey(e.to_string()))?;
        Ok(Self { mac, max_age: None })
    }

    /// Reject init-data whose `auth_date` is older than `max_age` in
    /// [`InitDataVerifier::authenticate_at`].
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Pure trust decision: `true` only when the signature matches.
    pub fn verify(&self, init_data: &str) -> bool {
        self.authenticate(init_data).is_ok()
    }

    /// Checks the signature and returns the decoded fields.
    pub fn authenticate(&self, init_data: &str) -> Result<InitData, TelegramAuthError> {
        let mut fields = parse_init_data(init_data)?;
        let provided = fields
            .remove(HASH_FIELD)
            .ok_or(TelegramAuthError::MissingHash)?;

        let computed = self.sign(&fields);
        if bool::from(computed.as_bytes().ct_eq(provided.as_bytes())) {
            Ok(InitData { fields })
        } else {
            Err(TelegramAuthError::InvalidSignature)
        }
    }

    /// Like [`InitDataVerifier::authenticate`], then enforces the configured
    /// maximum age against `now`. A missing or unparsable `auth_date` counts as
    /// expired when a maximum age is set.
    pub fn authenticate_at(
        &self,
        init_data: &str,
        now: DateTime<Utc>,
    ) -> Result<InitData, TelegramAuthError> {
        let data = self.authenticate(init_data)?;
        if let Some(max_age) = self.max_age {
            let issued = data.auth_date().ok_or(TelegramAuthError::Expired)?;
            if now.signed_duration_since(issued) > max_age {
                return Err(TelegramAuthError::Expired);
            }
        }
        Ok(data)
    }

    /// Lowercase hex signature of `fields` (which must not contain `hash`).
    pub fn sign(&self, fields: &BTreeMap<String, String>) -> String {
        let mut mac = self.mac.clone();
        mac.update(data_check_string(fields).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Free-standing form of [`InitDataVerifier::verify`]. A blank token is never
/// trusted.
pub fn verify_init_data(init_data: &str, bot_token: &str) -> bool {
    match InitDataVerifier::new(bot_token) {
        Ok(verifier) => verifier.verify(init_data),
        Err(_) => false,
    }
}

/// `key=value` lines in ascending key order, no trailing newline.
pub fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .filter(|(k, _)| k.as_str() != HASH_FIELD)
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn derive_secret_key(bot_token: &str) -> Result<Vec<u8>, TelegramAuthError> {
    let mut mac = HmacSha256::new_from_slice(KEY_DERIVATION_LABEL)
        .map_err(|e| TelegramAuthError::InvalidKey(e.to_string()))?;
    mac.update(bot_token.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Decodes an `application/x-www-form-urlencoded` string. Duplicate keys keep
/// the last value. Broken percent escapes and non-UTF-8 results are rejected.
pub fn parse_init_data(raw: &str) -> Result<BTreeMap<String, String>, TelegramAuthError> {
    let mut fields = BTreeMap::new();
    for segment in raw.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        fields.insert(decode_component(key)?, decode_component(value)?);
    }
    Ok(fields)
}

fn decode_component(input: &str) -> Result<String, TelegramAuthError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let escape = bytes
                    .get(i + 1..i + 3)
                    .ok_or_else(|| TelegramAuthError::Malformed("truncated percent escape".into()))?;
                let mut decoded = [0u8; 1];
                hex::decode_to_slice(escape, &mut decoded).map_err(|_| {
                    TelegramAuthError::Malformed("invalid percent escape".into())
                })?;
                out.push(decoded[0]);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| TelegramAuthError::Malformed("value is not UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reproduces_reference_hash() {
        let verifier = InitDataVerifier::new("test-secret").unwrap();
        let hash = verifier.sign(&fields(&[("auth_date", "1700000000"), ("first_name", "Ann")]));
        assert_eq!(
            hash,
            "db22c791660ff8c01bc0e7cd4b8e833f87e2d0623e306ee365408ed1fad9a99b"
        );
    }

    #[test]
    fn check_string_is_sorted_without_trailing_newline() {
        let check = data_check_string(&fields(&[
            ("user", "{}"),
            ("auth_date", "1"),
            ("hash", "ignored"),
            ("query_id", "q"),
        ]));
        assert_eq!(check, "auth_date=1\nquery_id=q\nuser={}");
    }

    #[test]
    fn parses_plus_and_percent_escapes() {
        let parsed = parse_init_data("a=x+y&b=%7B%22id%22%3A1%7D&flag").unwrap();
        assert_eq!(parsed["a"], "x y");
        assert_eq!(parsed["b"], "{\"id\":1}");
        assert_eq!(parsed["flag"], "");
    }

    #[test]
    fn last_duplicate_wins() {
        let parsed = parse_init_data("a=1&a=2").unwrap();
        assert_eq!(parsed["a"], "2");
    }

    #[test]
    fn rejects_broken_escapes() {
        assert!(matches!(
            parse_init_data("a=%zz"),
            Err(TelegramAuthError::Malformed(_))
        ));
        assert!(matches!(
            parse_init_data("a=%4"),
            Err(TelegramAuthError::Malformed(_))
        ));
        assert!(matches!(
            parse_init_data("a=%ff"),
            Err(TelegramAuthError::Malformed(_))
        ));
    }

    #[test]
    fn blank_token_is_rejected() {
        assert_eq!(
            InitDataVerifier::new("  ").unwrap_err(),
            TelegramAuthError::EmptySecret
        );
        assert!(!verify_init_data("auth_date=1&hash=00", ""));
    }

    #[test]
    fn debug_output_hides_key() {
        let verifier = InitDataVerifier::new("123:abc").unwrap();
        let rendered = format!("{:?}", verifier);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("123:abc"));
    }

    #[test]
    fn expiry_is_enforced_only_when_configured() {
        let verifier = InitDataVerifier::new("test-secret").unwrap();
        let data = fields(&[("auth_date", "1700000000"), ("first_name", "Ann")]);
        let raw = format!(
            "auth_date=1700000000&first_name=Ann&hash={}",
            verifier.sign(&data)
        );
        let now = Utc.timestamp_opt(1_700_000_000 + 7200, 0).unwrap();

        assert!(verifier.authenticate_at(&raw, now).is_ok());

        let strict = verifier.with_max_age(Some(Duration::hours(1)));
        assert_eq!(
            strict.authenticate_at(&raw, now).unwrap_err(),
            TelegramAuthError::Expired
        );
        let fresh = Utc.timestamp_opt(1_700_000_000 + 60, 0).unwrap();
        assert!(strict.authenticate_at(&raw, fresh).is_ok());
    }

    #[test]
    fn decodes_user_object() {
        let verifier = InitDataVerifier::new("test-secret").unwrap();
        let user = r#"{"id":42,"first_name":"Ann","username":"ann"}"#;
        let data = fields(&[("auth_date", "1700000000"), ("user", user)]);
        let raw = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("auth_date", "1700000000")
            .append_pair("user", user)
            .append_pair("hash", &verifier.sign(&data))
            .finish();

        let init = verifier.authenticate(&raw).unwrap();
        let parsed = init.user().unwrap();
        assert_eq!(parsed.id, 42);
        assert_eq!(parsed.username.as_deref(), Some("ann"));
        assert_eq!(init.auth_date().unwrap().timestamp(), 1_700_000_000);
    }
}
