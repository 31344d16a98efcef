//! Fraud heuristics
//!
//! Each check is a pure function of the invoice, its supplier history and
//! the rule table. Checks never see each other's output.

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::{Datelike, Timelike, Weekday};
use serde_json::json;

use super::FraudContext;
use crate::config::{FraudRules, IndicatorWeight};
use crate::error::CheckError;
use crate::models::{FraudIndicator, FraudIndicatorKind, Invoice};

pub type CheckResult = Result<Vec<FraudIndicator>, CheckError>;
pub type Check = fn(&Invoice, &FraudContext, &FraudRules) -> CheckResult;

/// Every check, with the name used in logs
pub const CHECKS: [(&str, Check); 7] = [
    ("amount", check_amount as Check),
    ("supplier", check_supplier as Check),
    ("timing", check_timing as Check),
    ("pattern", check_invoice_number as Check),
    ("duplicate", check_duplicates as Check),
    ("vendor", check_vendor_name as Check),
    ("behavioral", check_creator_activity as Check),
];

fn indicator(
    kind: FraudIndicatorKind,
    weight: IndicatorWeight,
    description: String,
    evidence: serde_json::Value,
) -> FraudIndicator {
    FraudIndicator {
        kind,
        severity: weight.severity,
        description,
        evidence,
        confidence: weight.confidence,
    }
}

fn to_f64(value: &BigDecimal, field: &'static str) -> Result<f64, CheckError> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CheckError::NonNumeric {
            field,
            value: value.to_string(),
        })
}

/// Large, round, or statistically unusual amounts
pub fn check_amount(invoice: &Invoice, ctx: &FraudContext, rules: &FraudRules) -> CheckResult {
    let amount = &invoice.total_amount;
    let mut found = Vec::new();

    if *amount > rules.large_amount_threshold {
        found.push(indicator(
            FraudIndicatorKind::AmountAnomaly,
            rules.large_amount,
            format!(
                "Invoice amount {} exceeds {}",
                amount, rules.large_amount_threshold
            ),
            json!({
                "rule": "large_amount",
                "amount": amount.to_string(),
                "threshold": rules.large_amount_threshold.to_string(),
            }),
        ));
    }

    if *amount > BigDecimal::zero() && !rules.round_amount_divisor.is_zero() {
        let quotient = amount / &rules.round_amount_divisor;
        if quotient.with_scale(0) == quotient {
            found.push(indicator(
                FraudIndicatorKind::AmountAnomaly,
                rules.round_amount,
                format!(
                    "Invoice amount {} is a round multiple of {}",
                    amount, rules.round_amount_divisor
                ),
                json!({
                    "rule": "round_amount",
                    "amount": amount.to_string(),
                    "divisor": rules.round_amount_divisor.to_string(),
                }),
            ));
        }
    }

    if ctx.history.len() >= rules.outlier_min_samples.max(2) {
        let samples = ctx
            .history
            .iter()
            .map(|inv| to_f64(&inv.total_amount, "historical amount"))
            .collect::<Result<Vec<f64>, _>>()?;

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let stdev = variance.sqrt();
        if !stdev.is_finite() {
            return Err(CheckError::NonFinite("amount standard deviation"));
        }

        let limit = mean + rules.outlier_stdev_multiplier * stdev;
        let current = to_f64(amount, "invoice amount")?;
        if current > limit {
            found.push(indicator(
                FraudIndicatorKind::AmountAnomaly,
                rules.statistical_outlier,
                format!(
                    "Invoice amount {} is more than {} standard deviations above the supplier average {:.2}",
                    amount, rules.outlier_stdev_multiplier, mean
                ),
                json!({
                    "rule": "statistical_outlier",
                    "amount": current,
                    "mean": mean,
                    "stdev": stdev,
                    "limit": limit,
                    "samples": samples.len(),
                }),
            ));
        }
    }

    Ok(found)
}

/// First-time suppliers and unusual same-day volume
pub fn check_supplier(invoice: &Invoice, ctx: &FraudContext, rules: &FraudRules) -> CheckResult {
    let mut found = Vec::new();

    if ctx.history.is_empty() {
        found.push(indicator(
            FraudIndicatorKind::SupplierAnomaly,
            rules.new_supplier,
            format!("No prior invoices from supplier '{}'", invoice.supplier_name),
            json!({
                "rule": "new_supplier",
                "supplier": invoice.supplier_name,
                "history_window_days": rules.history_window_days,
            }),
        ));
    }

    let day = invoice.invoice_date.date_naive();
    let same_day: Vec<&Invoice> = ctx
        .history
        .iter()
        .filter(|inv| inv.invoice_date.date_naive() == day)
        .collect();
    let day_total = same_day
        .iter()
        .fold(invoice.total_amount.clone(), |acc, inv| acc + &inv.total_amount);

    if day_total > rules.daily_volume_threshold {
        found.push(indicator(
            FraudIndicatorKind::SupplierAnomaly,
            rules.high_daily_volume,
            format!(
                "Supplier '{}' invoiced {} on {}, above {}",
                invoice.supplier_name, day_total, day, rules.daily_volume_threshold
            ),
            json!({
                "rule": "high_daily_volume",
                "date": day.to_string(),
                "day_total": day_total.to_string(),
                "invoice_count": same_day.len() + 1,
                "threshold": rules.daily_volume_threshold.to_string(),
            }),
        ));
    }

    Ok(found)
}

/// Weekend or out-of-hours invoice dates
pub fn check_timing(invoice: &Invoice, _ctx: &FraudContext, rules: &FraudRules) -> CheckResult {
    let mut found = Vec::new();
    let weekday = invoice.invoice_date.weekday();

    if matches!(weekday, Weekday::Sat | Weekday::Sun) {
        found.push(indicator(
            FraudIndicatorKind::TimingAnomaly,
            rules.weekend,
            format!("Invoice dated on a weekend ({})", weekday),
            json!({
                "rule": "weekend",
                "invoice_date": invoice.invoice_date.to_rfc3339(),
                "weekday": weekday.to_string(),
            }),
        ));
    }

    let hour = invoice.invoice_date.hour();
    if hour < rules.business_hours_start || hour > rules.business_hours_end {
        found.push(indicator(
            FraudIndicatorKind::TimingAnomaly,
            rules.off_hours,
            format!("Invoice dated outside business hours ({:02}:00)", hour),
            json!({
                "rule": "off_hours",
                "invoice_date": invoice.invoice_date.to_rfc3339(),
                "hour": hour,
            }),
        ));
    }

    Ok(found)
}

/// Invoice number reused from the supplier's most recent invoices
pub fn check_invoice_number(
    invoice: &Invoice,
    ctx: &FraudContext,
    rules: &FraudRules,
) -> CheckResult {
    let number = invoice.invoice_number.trim();
    if number.is_empty() {
        return Ok(Vec::new());
    }

    let mut recent: Vec<&Invoice> = ctx.history.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let repeated = recent
        .iter()
        .take(rules.recent_invoice_numbers)
        .find(|inv| inv.invoice_number.trim() == number);

    Ok(repeated
        .map(|prior| {
            indicator(
                FraudIndicatorKind::PatternAnomaly,
                rules.repeated_invoice_number,
                format!(
                    "Invoice number {} repeats a recent invoice from the same supplier",
                    number
                ),
                json!({
                    "rule": "repeated_invoice_number",
                    "invoice_number": number,
                    "prior_invoice_id": prior.id,
                    "recent_window": rules.recent_invoice_numbers,
                }),
            )
        })
        .into_iter()
        .collect())
}

/// Near-identical amount submitted close in time
pub fn check_duplicates(invoice: &Invoice, ctx: &FraudContext, rules: &FraudRules) -> CheckResult {
    let window_secs = rules.duplicate_window_hours * 3600;

    let suspects: Vec<i64> = ctx
        .history
        .iter()
        .filter(|other| {
            (&other.total_amount - &invoice.total_amount).abs() <= rules.duplicate_amount_tolerance
        })
        .filter(|other| (other.created_at - invoice.created_at).num_seconds().abs() <= window_secs)
        .map(|other| other.id)
        .collect();

    if suspects.is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![indicator(
        FraudIndicatorKind::DuplicateSuspect,
        rules.duplicate_suspect,
        format!(
            "{} invoice(s) from '{}' with a similar amount within {} hours",
            suspects.len(),
            invoice.supplier_name,
            rules.duplicate_window_hours
        ),
        json!({
            "rule": "duplicate_suspect",
            "similar_invoice_ids": suspects,
            "amount": invoice.total_amount.to_string(),
            "amount_tolerance": rules.duplicate_amount_tolerance.to_string(),
        }),
    )])
}

/// Placeholder-looking supplier names
pub fn check_vendor_name(invoice: &Invoice, _ctx: &FraudContext, rules: &FraudRules) -> CheckResult {
    let name = invoice.supplier_name.to_lowercase();
    let hits: Vec<&str> = rules
        .suspicious_vendor_keywords
        .iter()
        .map(|k| k.as_str())
        .filter(|k| !k.is_empty() && name.contains(&k.to_lowercase()))
        .collect();

    if hits.is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![indicator(
        FraudIndicatorKind::VendorRisk,
        rules.vendor_risk,
        format!(
            "Supplier name '{}' looks like a placeholder",
            invoice.supplier_name
        ),
        json!({
            "rule": "suspicious_vendor_name",
            "supplier": invoice.supplier_name,
            "keywords": hits,
        }),
    )])
}

/// Submitting user creating unusually many invoices
pub fn check_creator_activity(
    invoice: &Invoice,
    ctx: &FraudContext,
    rules: &FraudRules,
) -> CheckResult {
    let (Some(user_id), Some(count)) = (invoice.created_by, ctx.creator_recent_invoices) else {
        return Ok(Vec::new());
    };

    if count <= rules.creator_invoice_limit {
        return Ok(Vec::new());
    }

    Ok(vec![indicator(
        FraudIndicatorKind::BehavioralAnomaly,
        rules.behavioral,
        format!(
            "User {} created {} invoices in the last {} days",
            user_id, count, rules.creator_window_days
        ),
        json!({
            "rule": "creator_volume",
            "user_id": user_id,
            "invoice_count": count,
            "window_days": rules.creator_window_days,
            "limit": rules.creator_invoice_limit,
        }),
    )])
}
