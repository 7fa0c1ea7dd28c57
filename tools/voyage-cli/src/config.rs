//! CLI configuration.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use voyage_commerce::cart::{PricingPolicy, Promo, PromoTable};
use voyage_commerce::money::{Currency, Money};

/// Config file names searched for, in order, from the working directory up.
pub const CONFIG_NAMES: [&str; 3] = ["voyage.toml", ".voyage.toml", "voyage.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart pricing rules.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Extra promo codes on top of the built-in ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub promos: Vec<PromoConfig>,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchConfig,

    /// Catalog API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Cart persistence.
    #[serde(default)]
    pub cart: CartConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.pricing.currency)
            .ok_or_else(|| anyhow!("Unknown currency: {}", self.pricing.currency))
    }

    /// Pricing rules for cart totals.
    pub fn pricing_policy(&self) -> Result<PricingPolicy> {
        let currency = self.currency()?;
        Ok(PricingPolicy {
            currency,
            free_shipping_threshold: Money::from_decimal(self.pricing.free_shipping_threshold, currency),
            shipping_fee: Money::from_decimal(self.pricing.shipping_fee, currency),
            tax_rate_percent: self.pricing.tax_rate_percent,
        })
    }

    /// Built-in codes plus the configured ones; configured codes win.
    pub fn promo_table(&self) -> Result<PromoTable> {
        let currency = self.currency()?;
        let mut table = PromoTable::default();
        for promo in &self.promos {
            table.insert(promo.to_promo(currency)?);
        }
        Ok(table)
    }

    /// Problems that make the config unusable, then ones worth a warning.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if Currency::from_code(&self.pricing.currency).is_none() {
            errors.push(format!("pricing.currency '{}' is not supported", self.pricing.currency));
        }
        if self.pricing.shipping_fee < 0.0 || self.pricing.free_shipping_threshold < 0.0 {
            errors.push("pricing amounts must not be negative".to_string());
        }
        if !(0.0..=100.0).contains(&self.pricing.tax_rate_percent) {
            errors.push("pricing.tax_rate_percent must be 0-100".to_string());
        }

        for (i, promo) in self.promos.iter().enumerate() {
            if promo.code.trim().is_empty() {
                errors.push(format!("promos[{}].code is required", i));
            }
            match (promo.kind.as_str(), promo.value) {
                ("percentage", Some(v)) if (0.0..=100.0).contains(&v) => {}
                ("percentage", _) => errors.push(format!("promos[{}] needs a value of 0-100", i)),
                ("fixed", Some(v)) if v >= 0.0 => {}
                ("fixed", _) => errors.push(format!("promos[{}] needs a non-negative value", i)),
                ("free_shipping", _) => {}
                (other, _) => errors.push(format!("promos[{}].type '{}' is unknown", i, other)),
            }
        }

        if self.search.page_size == 0 {
            errors.push("search.page_size must be at least 1".to_string());
        }
        if self.search.debounce_ms > 5_000 {
            warnings.push(format!("search.debounce_ms {} feels unresponsive", self.search.debounce_ms));
        }

        if let Some(url) = &self.api.base_url {
            if reqwest::Url::parse(url).is_err() {
                errors.push(format!("api.base_url '{}' is not a valid URL", url));
            }
        }
        if self.api.retries > 10 {
            warnings.push("api.retries above 10 will make failures slow".to_string());
        }

        (errors, warnings)
    }
}

/// Pricing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Subtotals strictly above this ship free.
    #[serde(default = "default_threshold")]
    pub free_shipping_threshold: f64,

    #[serde(default = "default_shipping_fee")]
    pub shipping_fee: f64,

    #[serde(default = "default_tax_rate")]
    pub tax_rate_percent: f64,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_threshold() -> f64 {
    200.0
}

fn default_shipping_fee() -> f64 {
    50.0
}

fn default_tax_rate() -> f64 {
    5.0
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            free_shipping_threshold: default_threshold(),
            shipping_fee: default_shipping_fee(),
            tax_rate_percent: default_tax_rate(),
        }
    }
}

/// A promo code entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoConfig {
    pub code: String,

    #[serde(default)]
    pub description: Option<String>,

    /// `percentage`, `fixed`, or `free_shipping`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Percent off, or amount off in major units.
    #[serde(default)]
    pub value: Option<f64>,
}

impl PromoConfig {
    fn to_promo(&self, currency: Currency) -> Result<Promo> {
        let description = self.description.clone().unwrap_or_else(|| self.code.clone());
        match (self.kind.as_str(), self.value) {
            ("percentage", Some(percent)) => Ok(Promo::percentage(&self.code, description, percent)),
            ("fixed", Some(amount)) => Ok(Promo::fixed_amount(
                &self.code,
                description,
                Money::from_decimal(amount, currency),
            )),
            ("free_shipping", _) => Ok(Promo::free_shipping(&self.code, description)),
            (kind, _) => Err(anyhow!("Invalid promo {}: type '{}' with value {:?}", self.code, kind, self.value)),
        }
    }
}

/// Search section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Page size for paginated catalogs.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Quiet period for typed queries, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Directory holding `<catalog>.json` files.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_page_size() -> usize {
    12
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            data_dir: None,
        }
    }
}

/// Catalog API section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; catalogs are fetched from `{base_url}/{catalog}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> u32 {
    2
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

/// Cart section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartConfig {
    /// Snapshot file, relative to the working directory.
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,
}

fn default_snapshot() -> PathBuf {
    PathBuf::from(".voyage").join("cart.json")
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
        }
    }
}

/// Generate a default voyage.toml config file.
pub fn generate_default_config() -> String {
    r#"# Voyage storefront configuration

[pricing]
currency = "USD"
free_shipping_threshold = 200.0
shipping_fee = 50.0
tax_rate_percent = 5.0

# SAVE10 and FREESHIP are built in.
# [[promos]]
# code = "WELCOME5"
# type = "fixed"
# value = 5.0

[search]
page_size = 12
debounce_ms = 500
# data_dir = "data"

[api]
# base_url = "https://api.example.com/catalog/"
timeout_secs = 10
retries = 2

[cart]
snapshot = ".voyage/cart.json"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        let (errors, warnings) = config.validate();
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty());
        assert_eq!(config.pricing_policy().unwrap(), PricingPolicy::default());
        assert_eq!(config.cart.snapshot, default_snapshot());
    }

    #[test]
    fn test_configured_promos_extend_builtins() {
        let config: CliConfig = toml::from_str(
            r#"
            [pricing]
            currency = "EUR"

            [[promos]]
            code = "welcome5"
            type = "fixed"
            value = 5
            "#,
        )
        .unwrap();
        let table = config.promo_table().unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.lookup("WELCOME5").is_some());
        assert!(table.lookup("save10").is_some());
    }

    #[test]
    fn test_validate_reports_errors() {
        let mut config = CliConfig::default();
        config.pricing.currency = "XYZ".to_string();
        config.pricing.tax_rate_percent = 120.0;
        config.promos.push(PromoConfig {
            code: "HALF".to_string(),
            description: None,
            kind: "percentage".to_string(),
            value: None,
        });
        config.api.base_url = Some("not a url".to_string());

        let (errors, _) = config.validate();
        assert_eq!(errors.len(), 4);
        assert!(config.pricing_policy().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voyage.json");
        let path = path.to_str().unwrap();

        let mut config = CliConfig::default();
        config.search.page_size = 20;
        std::fs::write(path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = CliConfig::load(path).unwrap();
        assert_eq!(loaded.search.page_size, 20);
    }
}
