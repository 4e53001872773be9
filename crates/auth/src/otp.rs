//! `otpauth://` provisioning URL parsing for MFA enrollment.
//!
//! The enrollment endpoint returns a URL of the form
//! `otpauth://totp/Issuer:account?secret=BASE32&issuer=Issuer`; the portal
//! renders it as a QR code and also shows the secret for manual entry.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const DEFAULT_DIGITS: u8 = 6;
const DEFAULT_PERIOD_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpKind {
    Totp,
    Hotp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OtpAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl OtpAlgorithm {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SHA1" => Some(Self::Sha1),
            "SHA256" => Some(Self::Sha256),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }
}

/// A parsed provisioning URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpUri {
    pub kind: OtpKind,
    /// Decoded label, exactly as it appears in the URL path.
    pub label: String,
    pub issuer: Option<String>,
    pub account_name: String,
    /// Normalized base32 secret (uppercase, no spaces or padding).
    pub secret: String,
    pub algorithm: OtpAlgorithm,
    pub digits: u8,
    /// Time step in seconds (meaningful for TOTP only).
    pub period: u32,
    /// Initial counter, required for HOTP.
    pub counter: Option<u64>,
}

impl OtpUri {
    /// Secret in space-separated groups of four, for manual entry.
    pub fn grouped_secret(&self) -> String {
        self.secret
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OtpUriError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported scheme '{0}' (expected otpauth)")]
    UnsupportedScheme(String),

    #[error("unsupported OTP type '{0}' (expected totp or hotp)")]
    UnsupportedType(String),

    #[error("missing secret")]
    MissingSecret,

    #[error("secret is not valid base32")]
    InvalidSecret,

    #[error("invalid value for '{name}': {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("hotp URL is missing its counter")]
    MissingCounter,
}

/// Parse an `otpauth://` URL.
pub fn parse_otp_url(input: &str) -> Result<OtpUri, OtpUriError> {
    let url = Url::parse(input.trim()).map_err(|e| OtpUriError::InvalidUrl(e.to_string()))?;

    if !url.scheme().eq_ignore_ascii_case("otpauth") {
        return Err(OtpUriError::UnsupportedScheme(url.scheme().to_string()));
    }

    let kind = match url.host_str().map(str::to_ascii_lowercase).as_deref() {
        Some("totp") => OtpKind::Totp,
        Some("hotp") => OtpKind::Hotp,
        other => return Err(OtpUriError::UnsupportedType(other.unwrap_or_default().to_string())),
    };

    let label = percent_decode_str(url.path().trim_start_matches('/'))
        .decode_utf8_lossy()
        .into_owned();
    let (label_issuer, account_name) = match label.split_once(':') {
        Some((issuer, account)) => (non_empty(issuer), account.trim().to_string()),
        None => (None, label.trim().to_string()),
    };

    let mut secret = None;
    let mut issuer_param = None;
    let mut algorithm = OtpAlgorithm::default();
    let mut digits = DEFAULT_DIGITS;
    let mut period = DEFAULT_PERIOD_SECS;
    let mut counter: Option<u64> = None;

    for (name, value) in url.query_pairs() {
        match name.to_ascii_lowercase().as_str() {
            "secret" => secret = Some(normalize_secret(&value)?),
            "issuer" => issuer_param = non_empty(&value),
            "algorithm" => {
                algorithm = OtpAlgorithm::parse(&value).ok_or_else(|| invalid("algorithm", &value))?
            }
            "digits" => {
                digits = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|d| (6..=8).contains(d))
                    .ok_or_else(|| invalid("digits", &value))?
            }
            "period" => {
                period = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| invalid("period", &value))?
            }
            "counter" => {
                counter = Some(value.trim().parse().map_err(|_| invalid("counter", &value))?)
            }
            _ => {}
        }
    }

    let secret = secret.ok_or(OtpUriError::MissingSecret)?;
    if kind == OtpKind::Hotp && counter.is_none() {
        return Err(OtpUriError::MissingCounter);
    }

    Ok(OtpUri {
        kind,
        label,
        issuer: issuer_param.or(label_issuer),
        account_name,
        secret,
        algorithm,
        digits,
        period,
        counter,
    })
}

fn invalid(name: &'static str, value: &str) -> OtpUriError {
    OtpUriError::InvalidParameter {
        name,
        value: value.to_string(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn normalize_secret(raw: &str) -> Result<String, OtpUriError> {
    let secret: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if secret.is_empty() {
        return Err(OtpUriError::MissingSecret);
    }
    if !secret.chars().all(|c| matches!(c, 'A'..='Z' | '2'..='7')) {
        return Err(OtpUriError::InvalidSecret);
    }
    Ok(secret)
}
