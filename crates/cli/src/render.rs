use colored::Colorize;
use std::fmt::Write;
use value_analyst_core::domain::AnalysisResult;
use value_analyst_core::i18n::Strings;

/// Text rendition of the result cards, in upstream rank order.
pub fn cards(result: &AnalysisResult, s: &Strings) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", s.market_overview.to_uppercase().blue().bold());
    let _ = writeln!(out, "  \"{}\"", result.category_overview.italic());
    let _ = writeln!(out);

    for (rank, rec) in result.ranked() {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            format!("{} #{rank}", s.rank).on_blue().white().bold(),
            rec.name.bold(),
            rec.price.blue().bold()
        );
        let _ = writeln!(out, "  {}", s.value_prop.dimmed());
        let _ = writeln!(out, "    {}", rec.why);
        let _ = writeln!(out, "  {}", s.key_specs.green());
        for spec in &rec.specs {
            let _ = writeln!(out, "    {} {spec}", "✓".green());
        }
        let _ = writeln!(out, "  {}", s.compromises.yellow());
        for con in &rec.cons {
            let _ = writeln!(out, "    {} {}", "!".yellow(), con.italic());
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", s.final_verdict.to_uppercase().blue().bold());
    let _ = writeln!(out, "  {}", result.final_verdict.bold());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use value_analyst_core::domain::{Language, ProductRecommendation};
    use value_analyst_core::i18n;

    fn result() -> AnalysisResult {
        let rec = |name: &str, price: &str| ProductRecommendation {
            name: name.to_string(),
            price: price.to_string(),
            why: "balanced".to_string(),
            specs: vec!["75% layout".to_string(), "hot-swap".to_string()],
            cons: vec!["heavy".to_string(), "loud".to_string()],
        };
        AnalysisResult {
            category_overview: "Prices are falling".to_string(),
            recommendations: vec![rec("Zeta", "$99"), rec("Alpha", "$79")],
            final_verdict: "Typists: Zeta".to_string(),
        }
    }

    #[test]
    fn renders_cards_in_given_order_with_labels() {
        colored::control::set_override(false);
        let text = cards(&result(), i18n::strings(Language::English));

        assert!(text.starts_with("MARKET OVERVIEW"));
        assert!(text.contains("Rank #1  Zeta  $99"));
        assert!(text.contains("Rank #2  Alpha  $79"));
        assert!(text.find("Zeta").unwrap() < text.find("Alpha").unwrap());
        assert!(text.contains("✓ hot-swap"));
        assert!(text.contains("! loud"));
        assert!(text.trim_end().ends_with("Typists: Zeta"));
    }
}
