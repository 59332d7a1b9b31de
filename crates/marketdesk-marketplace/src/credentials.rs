// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential resolution and per-marketplace completeness checks.

use marketdesk_core::{Credentials, MarketdeskError};

/// Where a set of credentials came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Supplied with the request.
    Explicit,
    /// Read from the stored integration.
    Integration,
    /// Process-wide fallback from configuration.
    Config,
}

/// Pick credentials in priority order: explicit, stored integration, config
/// fallback. Having none is a configuration error.
pub fn resolve(
    slug: &str,
    explicit: Option<Credentials>,
    stored: Option<Credentials>,
    fallback: Option<Credentials>,
) -> Result<(Credentials, CredentialSource), MarketdeskError> {
    let resolved = explicit
        .map(|c| (c, CredentialSource::Explicit))
        .or_else(|| stored.map(|c| (c, CredentialSource::Integration)))
        .or_else(|| fallback.map(|c| (c, CredentialSource::Config)))
        .ok_or_else(|| {
            MarketdeskError::Config(format!(
                "no credentials for {slug}: connect the marketplace or configure [marketplaces.{slug}]"
            ))
        })?;
    validate_for(slug, &resolved.0, resolved.1)?;
    Ok(resolved)
}

/// Check that `credentials` carry what `slug` needs.
///
/// Incomplete explicit credentials are the caller's mistake (validation);
/// incomplete stored or configured ones are a configuration problem.
pub fn validate_for(
    slug: &str,
    credentials: &Credentials,
    source: CredentialSource,
) -> Result<(), MarketdeskError> {
    let mut missing = Vec::new();
    if credentials.api_key.trim().is_empty() {
        missing.push("apiKey");
    }
    if slug == "ozon"
        && credentials
            .client_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty())
    {
        missing.push("clientId");
    }
    if missing.is_empty() {
        return Ok(());
    }

    let message = format!("{slug} credentials missing {}", missing.join(", "));
    Err(match source {
        CredentialSource::Explicit => MarketdeskError::Validation(message),
        CredentialSource::Integration | CredentialSource::Config => {
            MarketdeskError::Config(message)
        }
    })
}
