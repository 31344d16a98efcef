use crate::config::MatchingRules;
use crate::models::LineFields;
use crate::service::similarity::{item_code_match, numeric_proximity, round_score, text_similarity};

/// Best candidate for one invoice line on one side (PO or receipt)
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a, L> {
    pub line: &'a L,
    pub score: f64,
    pub description_similarity: f64,
}

/// Weighted similarity of an invoice line against one candidate line.
///
/// Returns `(score, description_similarity)`.
pub fn score_candidate<I, L>(invoice_line: &I, candidate: &L, rules: &MatchingRules) -> (f64, f64)
where
    I: LineFields,
    L: LineFields,
{
    let desc_sim = text_similarity(invoice_line.description(), candidate.description());
    // invoice values are the reference side
    let price_sim = numeric_proximity(invoice_line.unit_price(), candidate.unit_price());
    let qty_sim = numeric_proximity(invoice_line.quantity(), candidate.quantity());
    let code_exact = item_code_match(invoice_line.item_code(), candidate.item_code());

    let score = rules.description_weight * desc_sim
        + rules.price_weight * price_sim
        + rules.quantity_weight * qty_sim
        + rules.item_code_weight * code_exact;

    (round_score(score), desc_sim)
}

/// Highest-scoring candidate; the earliest wins ties. `None` for no candidates.
pub fn best_match<'a, I, L>(
    invoice_line: &I,
    candidates: &'a [L],
    rules: &MatchingRules,
) -> Option<ScoredCandidate<'a, L>>
where
    I: LineFields,
    L: LineFields,
{
    let mut best: Option<ScoredCandidate<'a, L>> = None;

    for candidate in candidates {
        let (score, description_similarity) = score_candidate(invoice_line, candidate, rules);
        let is_better = match &best {
            None => true,
            Some(current) => score > current.score,
        };
        if is_better {
            best = Some(ScoredCandidate {
                line: candidate,
                score,
                description_similarity,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentLine, InvoiceLine};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn invoice_line(desc: &str, qty: &str, price: &str, code: Option<&str>) -> InvoiceLine {
        InvoiceLine {
            description: desc.to_string(),
            quantity: dec(qty),
            unit_price: dec(price),
            total: dec(qty) * dec(price),
            item_code: code.map(str::to_string),
            gl_account: None,
        }
    }

    fn doc_line(id: i64, desc: &str, qty: &str, price: &str, code: Option<&str>) -> DocumentLine {
        DocumentLine {
            line_id: id,
            description: desc.to_string(),
            quantity: dec(qty),
            unit_price: dec(price),
            total: dec(qty) * dec(price),
            item_code: code.map(str::to_string),
        }
    }

    #[test]
    fn identical_line_with_code_scores_one() {
        let rules = MatchingRules::default();
        let inv = invoice_line("Office chair", "2", "150", Some("CH-01"));
        let po = doc_line(1, "office chair", "2", "150", Some("CH-01"));
        let (score, desc) = score_candidate(&inv, &po, &rules);
        assert!((score - 1.0).abs() < 1e-9);
        assert_eq!(desc, 1.0);
    }

    #[test]
    fn identical_line_without_code_misses_code_weight() {
        let rules = MatchingRules::default();
        let inv = invoice_line("Office chair", "2", "150", None);
        let po = doc_line(1, "Office chair", "2", "150", None);
        let (score, _) = score_candidate(&inv, &po, &rules);
        assert_eq!(score, 0.9);
    }

    #[test]
    fn picks_the_closest_candidate() {
        let rules = MatchingRules::default();
        let inv = invoice_line("Printer paper A4", "10", "5", None);
        let candidates = vec![
            doc_line(1, "Toner cartridge", "1", "80", None),
            doc_line(2, "Printer paper A4", "10", "5", None),
            doc_line(3, "Printer paper A3", "10", "6", None),
        ];

        let best = best_match(&inv, &candidates, &rules).unwrap();
        assert_eq!(best.line.line_id, 2);
    }

    #[test]
    fn first_candidate_wins_ties() {
        let rules = MatchingRules::default();
        let inv = invoice_line("Widget", "1", "10", None);
        let candidates = vec![
            doc_line(7, "Widget", "1", "10", None),
            doc_line(8, "Widget", "1", "10", None),
        ];
        assert_eq!(best_match(&inv, &candidates, &rules).unwrap().line.line_id, 7);
    }

    #[test]
    fn no_candidates_no_match() {
        let rules = MatchingRules::default();
        let inv = invoice_line("Widget", "1", "10", None);
        let candidates: Vec<DocumentLine> = Vec::new();
        assert!(best_match(&inv, &candidates, &rules).is_none());
    }

    #[test]
    fn zero_priced_invoice_line_does_not_produce_nan() {
        let rules = MatchingRules::default();
        let inv = invoice_line("Free sample", "1", "0", None);
        let po = doc_line(1, "Free sample", "1", "3", None);
        let (score, _) = score_candidate(&inv, &po, &rules);
        assert!(score.is_finite());
        assert!((score - 0.6).abs() < 1e-9);
    }
}
