//! Input resolution: validate the URL and identify the hosting service.
//!
//! Bad input should fail before a multi-second browser launch, so the URL is
//! parsed, checked for an HTTP(S) scheme and matched to a [`Source`] here.
//! An optional pre-flight GET confirms the host answers at all.

use crate::error::DeckError;
use crate::pipeline::sources::Source;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

/// A validated presentation URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The URL as given (trimmed). Case is preserved: deck IDs are case-sensitive.
    pub url: String,
    pub source: Source,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    let lower = input.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Parse and classify a presentation URL.
pub fn resolve_target(input: &str) -> Result<Target, DeckError> {
    let trimmed = input.trim();
    if !is_url(trimmed) {
        return Err(DeckError::InvalidUrl {
            input: input.to_string(),
            reason: "expected an http:// or https:// URL".into(),
        });
    }

    let parsed = reqwest::Url::parse(trimmed).map_err(|e| DeckError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(DeckError::InvalidUrl {
            input: input.to_string(),
            reason: "URL has no host".into(),
        });
    }

    let source = Source::detect(parsed.as_str()).ok_or_else(|| DeckError::UnsupportedSite {
        url: trimmed.to_string(),
    })?;
    debug!("Resolved {} deck: {}", source, trimmed);

    Ok(Target {
        url: trimmed.to_string(),
        source,
    })
}

/// Issue a GET to make sure the deck URL answers.
///
/// Only transport failures and 404/410 are fatal: the services answer bot-ish
/// clients with 401/403 often enough that those are merely logged.
pub async fn preflight(target: &Target, timeout_secs: u64) -> Result<(), DeckError> {
    info!("Checking {} is reachable", target.url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DeckError::Unreachable {
            url: target.url.clone(),
            reason: e.to_string(),
        })?;

    let response = client.get(&target.url).send().await.map_err(|e| {
        if e.is_timeout() {
            DeckError::PreflightTimeout {
                url: target.url.clone(),
                secs: timeout_secs,
            }
        } else {
            DeckError::Unreachable {
                url: target.url.clone(),
                reason: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Err(DeckError::Unreachable {
            url: target.url.clone(),
            reason: format!("HTTP {status}"),
        });
    }
    if !status.is_success() {
        warn!("Pre-flight got HTTP {status}; continuing with the browser");
    }
    Ok(())
}
