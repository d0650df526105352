//! Verdict rendering - pretty terminal output or JSON.

use anyhow::Result;
use brandvet_common::{TierStatus, ValidationPattern, ValidationVerdict};
use owo_colors::OwoColorize;

/// Render the full verdict as pretty, human-readable text.
pub fn render_pretty(verdict: &ValidationVerdict) -> String {
    let mut out = String::new();

    let pattern = match verdict.pattern {
        ValidationPattern::CategoryValidated | ValidationPattern::ClearMatch => {
            verdict.pattern.to_string().green().bold().to_string()
        }
        ValidationPattern::CategoryError => verdict.pattern.to_string().red().bold().to_string(),
        ValidationPattern::AmbiguousDescriptor | ValidationPattern::UnclearResult => {
            verdict.pattern.to_string().yellow().bold().to_string()
        }
    };

    out.push_str(&format!(
        "{}  confidence {:.2}\n\n",
        pattern, verdict.confidence
    ));
    out.push_str(&format!("{}\n\n", verdict.reasoning));
    out.push_str(&format!("{}\n", "Tier breakdown:".bold()));

    for result in &verdict.evidence.results {
        let status = match result.status {
            TierStatus::Succeeded => "succeeded".green().to_string(),
            TierStatus::Failed => "failed".red().to_string(),
            TierStatus::Skipped => "skipped".dimmed().to_string(),
            TierStatus::TimedOut => "timed out".yellow().to_string(),
        };
        let confidence = result
            .confidence
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "-".to_string());
        let label = result.label.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "  {:<20} {:<10} conf {:<5} {:>6}ms  {}\n",
            result.kind.as_str(),
            status,
            confidence,
            result.latency_ms,
            label
        ));
        if let Some(error) = &result.error {
            out.push_str(&format!("  {:<20} {}\n", "", error.dimmed()));
        }
    }

    out
}

/// Render the full verdict as pretty-printed JSON.
pub fn render_json(verdict: &ValidationVerdict) -> Result<String> {
    Ok(serde_json::to_string_pretty(verdict)?)
}

/// Exit code the shell sees, for scripting over batches.
pub fn exit_code(pattern: ValidationPattern) -> i32 {
    match pattern {
        ValidationPattern::CategoryValidated | ValidationPattern::ClearMatch => 0,
        ValidationPattern::AmbiguousDescriptor | ValidationPattern::UnclearResult => 2,
        ValidationPattern::CategoryError => 3,
    }
}
