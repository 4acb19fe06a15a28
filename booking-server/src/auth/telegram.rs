//! Telegram WebApp `initData` verification
//!
//! ```text
//! secret = HMAC_SHA256(key = "WebAppData", msg = bot_token)
//! check  = HMAC_SHA256(key = secret, msg = data_check_string)
//! data_check_string = sorted "key=value" pairs (without hash), joined by '\n'
//! ```

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use shared::{AppError, ErrorCode};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InitDataError {
    #[error("initData has no hash")]
    MissingHash,

    #[error("Invalid data: hash does not match")]
    SignatureMismatch,

    #[error("initData has no user")]
    MissingUser,

    #[error("Malformed user field: {0}")]
    MalformedUser(String),
}

impl From<InitDataError> for AppError {
    fn from(err: InitDataError) -> Self {
        match err {
            InitDataError::MissingHash | InitDataError::SignatureMismatch => {
                AppError::new(ErrorCode::SignatureInvalid)
            }
            InitDataError::MissingUser | InitDataError::MalformedUser(_) => {
                AppError::validation(err.to_string())
            }
        }
    }
}

/// `user` field of the init data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl WebAppUser {
    /// "first last" with missing parts skipped
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Verified init data
#[derive(Debug, Clone)]
pub struct InitData {
    pub user: WebAppUser,
    pub auth_date: Option<i64>,
    pub fields: BTreeMap<String, String>,
}

/// Sorted `key=value` lines of every field except `hash`
fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn secret_key(bot_token: &str) -> Result<Vec<u8>, InitDataError> {
    let mut mac =
        HmacSha256::new_from_slice(b"WebAppData").map_err(|_| InitDataError::SignatureMismatch)?;
    mac.update(bot_token.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Hex signature Telegram would attach to `fields`
pub fn sign(fields: &BTreeMap<String, String>, bot_token: &str) -> Result<String, InitDataError> {
    let mut mac = HmacSha256::new_from_slice(&secret_key(bot_token)?)
        .map_err(|_| InitDataError::SignatureMismatch)?;
    mac.update(data_check_string(fields).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify the raw query string and extract the user
pub fn verify_init_data(init_data: &str, bot_token: &str) -> Result<InitData, InitDataError> {
    let mut fields: BTreeMap<String, String> = url::form_urlencoded::parse(init_data.as_bytes())
        .into_owned()
        .collect();
    let hash = fields.remove("hash").ok_or(InitDataError::MissingHash)?;

    // constant-time comparison via verify_slice
    let sig_bytes = hex::decode(hash.trim()).map_err(|_| InitDataError::SignatureMismatch)?;
    let mut mac = HmacSha256::new_from_slice(&secret_key(bot_token)?)
        .map_err(|_| InitDataError::SignatureMismatch)?;
    mac.update(data_check_string(&fields).as_bytes());
    mac.verify_slice(&sig_bytes)
        .map_err(|_| InitDataError::SignatureMismatch)?;

    let user_json = fields.get("user").ok_or(InitDataError::MissingUser)?;
    let user: WebAppUser = serde_json::from_str(user_json)
        .map_err(|e| InitDataError::MalformedUser(e.to_string()))?;
    let auth_date = fields.get("auth_date").and_then(|v| v.parse().ok());

    Ok(InitData {
        user,
        auth_date,
        fields,
    })
}
