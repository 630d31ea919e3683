//! Report limit policies.
//!
//! Every endpoint that takes a `limit` (or page size) has a named policy.
//! Call sites never hardcode ceilings; they look the policy up here.

use serde::{Deserialize, Serialize};

/// Fallback rule for caller-supplied limits.
///
/// A missing, non-positive, or above-ceiling limit silently becomes
/// `default`. It is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPolicy {
    pub default: usize,
    pub max:     usize,
}

impl LimitPolicy {
    pub const fn new(default: usize, max: usize) -> Self {
        Self { default, max }
    }

    pub fn clamp(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 && (n as u64) <= self.max as u64 => n as usize,
            _ => self.default,
        }
    }
}

pub const TOP_BRANDS_LIMIT: LimitPolicy = LimitPolicy::new(2, 50);
pub const TOP_MODELS_LIMIT: LimitPolicy = LimitPolicy::new(10, 100);
pub const TOP_DEALERS_LIMIT: LimitPolicy = LimitPolicy::new(10, 100);
pub const TOP_COLORS_LIMIT: LimitPolicy = LimitPolicy::new(10, 100);
pub const UNSOLD_PAGE_SIZE: LimitPolicy = LimitPolicy::new(50, 200);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_top_brands")]
    pub top_brands: LimitPolicy,
    #[serde(default = "default_top_models")]
    pub top_models: LimitPolicy,
    #[serde(default = "default_top_dealers")]
    pub top_dealers: LimitPolicy,
    #[serde(default = "default_top_colors")]
    pub top_colors: LimitPolicy,
    #[serde(default = "default_unsold_page_size")]
    pub unsold_page_size: LimitPolicy,
}

fn default_top_brands() -> LimitPolicy { TOP_BRANDS_LIMIT }
fn default_top_models() -> LimitPolicy { TOP_MODELS_LIMIT }
fn default_top_dealers() -> LimitPolicy { TOP_DEALERS_LIMIT }
fn default_top_colors() -> LimitPolicy { TOP_COLORS_LIMIT }
fn default_unsold_page_size() -> LimitPolicy { UNSOLD_PAGE_SIZE }

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_brands: TOP_BRANDS_LIMIT,
            top_models: TOP_MODELS_LIMIT,
            top_dealers: TOP_DEALERS_LIMIT,
            top_colors: TOP_COLORS_LIMIT,
            unsold_page_size: UNSOLD_PAGE_SIZE,
        }
    }
}

impl AnalyticsConfig {
    /// Load from a JSON file. Policies missing from the file keep their
    /// built-in values.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalyticsConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let policies = [
            ("top_brands", self.top_brands),
            ("top_models", self.top_models),
            ("top_dealers", self.top_dealers),
            ("top_colors", self.top_colors),
            ("unsold_page_size", self.unsold_page_size),
        ];
        for (name, policy) in policies {
            if policy.default == 0 || policy.default > policy.max {
                anyhow::bail!(
                    "limit policy '{name}': default {} must be in 1..={}",
                    policy.default,
                    policy.max
                );
            }
        }
        Ok(())
    }
}
