//! Output formatting for resolution results.

use anyhow::Result;
use clipscout_core::ExtractionResult;
use clipscout_resolve::ResolveOutcome;

/// Prints the result as human-readable text.
pub fn print_text(result: &ExtractionResult, outcome: &ResolveOutcome, verbose: bool) {
    println!("@{} / {}", result.author, result.content_id);
    if let Some(text) = &result.text {
        println!("  {}", text.replace('\n', " "));
    }
    if let Some(duration_ms) = result.duration_ms {
        let secs = duration_ms as f64 / 1000.0;
        println!("  duration: {secs:.1}s");
    }
    println!();

    for variant in &result.variants {
        let dims = if variant.width > 0 {
            format!("{}x{}", variant.width, variant.height)
        } else {
            "?".to_string()
        };
        println!(
            "  {:>8}  {:>9}  {}",
            variant.quality_label, dims, variant.url
        );
    }

    if let Some(thumbnail) = &result.thumbnail {
        println!("\n  thumbnail: {thumbnail}");
    }

    if verbose {
        println!();
        for attempt in &outcome.attempts {
            let status = if attempt.success { "ok" } else { "failed" };
            println!(
                "  [{}] {} in {:.2}s",
                attempt.strategy,
                status,
                attempt.duration.as_secs_f64()
            );
        }
    }
}

/// Prints the result as JSON for scripting.
pub fn print_json(result: &ExtractionResult, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{rendered}");
    Ok(())
}
