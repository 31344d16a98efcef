use bigdecimal::BigDecimal;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub rules: VerificationRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Statements slower than this are logged at WARN
    pub slow_statement_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/invoice_verify".to_string()),
                max_connections: 20,
                acquire_timeout_secs: 10,
                slow_statement_secs: 5,
            },
            rules: VerificationRules::default(),
        }
    }
}

impl AppConfig {
    /// Layered load: defaults (and legacy SERVER_HOST / SERVER_PORT / DATABASE_URL),
    /// then `config/verification.toml` if present, then `VERIFY__*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/verification")
    }

    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix("VERIFY").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Single table of every tunable constant used by both engines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationRules {
    pub matching: MatchingRules,
    pub fraud: FraudRules,
}

/// Three-way match tolerances and similarity weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingRules {
    /// Absolute unit-price tolerance (currency units)
    pub price_tolerance: BigDecimal,
    /// Absolute quantity tolerance (units)
    pub quantity_tolerance: BigDecimal,
    pub description_weight: f64,
    pub price_weight: f64,
    pub quantity_weight: f64,
    pub item_code_weight: f64,
    /// Description similarity below this raises a warning
    pub description_match_threshold: f64,
    /// Share of perfect lines that still counts as a partial match
    pub partial_match_ratio: f64,
    /// |variance %| above this raises a warning
    pub variance_warning_percentage: f64,
}

impl Default for MatchingRules {
    fn default() -> Self {
        Self {
            price_tolerance: BigDecimal::new(1.into(), 2),
            quantity_tolerance: BigDecimal::new(1.into(), 2),
            description_weight: 0.4,
            price_weight: 0.3,
            quantity_weight: 0.2,
            item_code_weight: 0.1,
            description_match_threshold: 0.7,
            partial_match_ratio: 0.8,
            variance_warning_percentage: 5.0,
        }
    }
}

/// Severity and confidence attached to one indicator trigger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWeight {
    pub severity: f64,
    pub confidence: f64,
}

impl IndicatorWeight {
    pub const fn new(severity: f64, confidence: f64) -> Self {
        Self {
            severity,
            confidence,
        }
    }
}

/// Fraud heuristics, their triggers and the aggregation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudRules {
    pub history_window_days: i64,

    pub large_amount_threshold: BigDecimal,
    pub large_amount: IndicatorWeight,
    pub round_amount_divisor: BigDecimal,
    pub round_amount: IndicatorWeight,
    pub outlier_stdev_multiplier: f64,
    pub outlier_min_samples: usize,
    pub statistical_outlier: IndicatorWeight,

    pub new_supplier: IndicatorWeight,
    pub daily_volume_threshold: BigDecimal,
    pub high_daily_volume: IndicatorWeight,

    pub weekend: IndicatorWeight,
    pub business_hours_start: u32,
    pub business_hours_end: u32,
    pub off_hours: IndicatorWeight,

    pub recent_invoice_numbers: usize,
    pub repeated_invoice_number: IndicatorWeight,

    pub duplicate_amount_tolerance: BigDecimal,
    pub duplicate_window_hours: i64,
    pub duplicate_suspect: IndicatorWeight,

    pub suspicious_vendor_keywords: Vec<String>,
    pub vendor_risk: IndicatorWeight,

    pub creator_window_days: i64,
    pub creator_invoice_limit: i64,
    pub behavioral: IndicatorWeight,

    pub scoring: ScoringRules,
}

impl Default for FraudRules {
    fn default() -> Self {
        Self {
            history_window_days: 90,

            large_amount_threshold: BigDecimal::from(100_000),
            large_amount: IndicatorWeight::new(0.8, 0.9),
            round_amount_divisor: BigDecimal::from(1_000),
            // keep confidence below 0.6: a large round amount from a new
            // supplier must score above the manual review cut-off
            round_amount: IndicatorWeight::new(0.3, 0.5),
            outlier_stdev_multiplier: 3.0,
            outlier_min_samples: 2,
            statistical_outlier: IndicatorWeight::new(0.7, 0.8),

            new_supplier: IndicatorWeight::new(0.6, 0.8),
            daily_volume_threshold: BigDecimal::from(500_000),
            high_daily_volume: IndicatorWeight::new(0.8, 0.7),

            weekend: IndicatorWeight::new(0.4, 0.6),
            business_hours_start: 8,
            business_hours_end: 18,
            off_hours: IndicatorWeight::new(0.3, 0.6),

            recent_invoice_numbers: 5,
            repeated_invoice_number: IndicatorWeight::new(0.8, 0.9),

            duplicate_amount_tolerance: BigDecimal::from(1),
            duplicate_window_hours: 24,
            duplicate_suspect: IndicatorWeight::new(0.7, 0.8),

            suspicious_vendor_keywords: ["test", "demo", "sample", "fake", "dummy"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            vendor_risk: IndicatorWeight::new(0.9, 0.7),

            creator_window_days: 30,
            creator_invoice_limit: 50,
            behavioral: IndicatorWeight::new(0.6, 0.7),

            scoring: ScoringRules::default(),
        }
    }
}

/// Risk level cut-offs and decision thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub critical_threshold: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
    /// Carried for tuning; the level classifier never compares against it
    pub low_threshold: f64,
    pub manual_review_score: f64,
    pub manual_review_indicator_count: usize,
    pub auto_approve_score: f64,
    pub auto_reject_score: f64,
    pub auto_reject_severity: f64,
    /// Indicators above this severity add two priority points each
    pub priority_severity: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            critical_threshold: 1.0,
            high_threshold: 0.8,
            medium_threshold: 0.6,
            low_threshold: 0.3,
            manual_review_score: 0.6,
            manual_review_indicator_count: 3,
            auto_approve_score: 0.3,
            auto_reject_score: 0.9,
            auto_reject_severity: 0.9,
            priority_severity: 0.8,
        }
    }
}
