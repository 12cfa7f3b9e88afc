//! Centralized configuration (environment variables + defaults).

use crate::domain::audit::DeleteAuditPolicy;
use anyhow::Context;

/// Database URL must be provided (no default) for safety.
pub fn database_url() -> anyhow::Result<String> {
    std::env::var("DATABASE_URL").context("DATABASE_URL must be set")
}

/// Pool size (default 5).
pub fn max_connections() -> u32 {
    std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(5)
        .max(1)
}

/// Address the API server binds to.
pub fn listen_addr() -> String {
    std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// Whether deletions always write a `deleted` audit entry.
///
/// Accepts `always` (default) or `when_no_prior_snapshot`.
pub fn delete_audit_policy() -> anyhow::Result<DeleteAuditPolicy> {
    match std::env::var("DELETE_AUDIT_POLICY") {
        Ok(v) => v
            .parse::<DeleteAuditPolicy>()
            .map_err(|e| anyhow::anyhow!("DELETE_AUDIT_POLICY: {}", e)),
        Err(_) => Ok(DeleteAuditPolicy::default()),
    }
}

/// Internal error details are only surfaced to HTTP clients in development.
pub fn expose_internal_errors() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v.eq_ignore_ascii_case("development"))
        .unwrap_or(false)
}
