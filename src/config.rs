//! Configuration management.
//!
//! Loads settings from environment variables and a `.env` file at startup.
//! The result is an explicit object handed to whatever embeds the crate;
//! the engine and ledger modules never read the environment themselves.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Where quotes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource {
    /// Deterministic in-process table. Default for sims and tests.
    Static,
    /// External market-data API; requires a base URL and token.
    Live,
}

impl FromStr for QuoteSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "live" => Ok(Self::Live),
            _ => Err(format!("Invalid quote source: {s}")),
        }
    }
}

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    // Quote provider
    pub quote_source: QuoteSource,
    pub quote_base_url: String,
    pub quote_api_token: String,

    // Accounts
    pub default_opening_balance: Decimal,

    // Settlement
    pub max_conflict_retries: u32,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Settings {
    /// Load settings from environment variables (and `.env` file).
    pub fn from_env() -> Self {
        // Try to load .env file (ignore if not found).
        let _ = dotenvy::dotenv();

        Self {
            quote_source: env_str("QUOTE_SOURCE", "static")
                .parse()
                .unwrap_or(QuoteSource::Static),
            quote_base_url: env_str("QUOTE_BASE_URL", ""),
            quote_api_token: env_str("QUOTE_API_TOKEN", ""),

            default_opening_balance: env_decimal("DEFAULT_OPENING_BALANCE", Decimal::new(1000, 0)),

            max_conflict_retries: env_u32("MAX_CONFLICT_RETRIES", 3),

            log_level: env_str("LOG_LEVEL", "info"),
            log_json: env_bool("LOG_JSON", false),
        }
    }

    /// Validate configuration for critical requirements.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.quote_source == QuoteSource::Live {
            if self.quote_base_url.is_empty() {
                errors.push("QUOTE_BASE_URL is required for live quotes".to_string());
            }
            if self.quote_api_token.is_empty() {
                errors.push("QUOTE_API_TOKEN is required for live quotes".to_string());
            }
        }

        if self.default_opening_balance < Decimal::ZERO {
            errors.push("DEFAULT_OPENING_BALANCE must be non-negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Environment helpers
// =============================================================================

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_decimal(key: &str, default: Decimal) -> Decimal {
    std::env::var(key)
        .ok()
        .and_then(|v| Decimal::from_str(&v).ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
