use anyhow::ensure;
use serde::{Deserialize, Serialize};

pub const EXPECTED_RECOMMENDATIONS: usize = 3;
pub const SPECS_RANGE: std::ops::RangeInclusive<usize> = 3..=5;
pub const EXPECTED_CONS: usize = 2;

/// Parsed model answer. `recommendations` is already ranked best-to-worst
/// upstream and is never reordered here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub category_overview: String,
    pub recommendations: Vec<ProductRecommendation>,
    pub final_verdict: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecommendation {
    pub name: String,
    /// Human-readable estimate, e.g. "$129".
    pub price: String,
    pub why: String,
    pub specs: Vec<String>,
    pub cons: Vec<String>,
}

impl AnalysisResult {
    /// Checks the arities the prompt asks for. The response schema cannot
    /// express them, so callers decide whether a violation is fatal.
    pub fn check_arity(&self) -> anyhow::Result<()> {
        ensure!(
            self.recommendations.len() == EXPECTED_RECOMMENDATIONS,
            "expected exactly {EXPECTED_RECOMMENDATIONS} recommendations (got {})",
            self.recommendations.len()
        );

        for (idx, rec) in self.recommendations.iter().enumerate() {
            let rank = idx + 1;
            ensure!(
                SPECS_RANGE.contains(&rec.specs.len()),
                "recommendation #{rank} must have 3..=5 specs (got {})",
                rec.specs.len()
            );
            ensure!(
                rec.cons.len() == EXPECTED_CONS,
                "recommendation #{rank} must have exactly {EXPECTED_CONS} cons (got {})",
                rec.cons.len()
            );
        }

        Ok(())
    }

    /// Recommendations paired with their 1-based rank, in upstream order.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &ProductRecommendation)> {
        self.recommendations
            .iter()
            .enumerate()
            .map(|(idx, rec)| (idx + 1, rec))
    }
}
