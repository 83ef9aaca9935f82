use anyhow::Result;

use scrollreel_core::sequence::{enforce_layout, scan_layout, LayoutReport, SequenceDescriptor};
use scrollreel_core::AppConfig;

/// Scan every configured sequence directory under the assets root
pub fn scan_all(config: &AppConfig) -> Result<Vec<LayoutReport>> {
    let root = config.assets_dir();
    config
        .sequences()
        .map(|section| {
            let descriptor = SequenceDescriptor::from_section(section)?;
            Ok(scan_layout(&root, &descriptor)?)
        })
        .collect()
}

/// Frame-count check run before any player mounts
pub fn check_assets(config: &AppConfig) -> Result<()> {
    for report in scan_all(config)? {
        enforce_layout(&report, config.general.strict_assets)?;
    }
    Ok(())
}

/// Shorten a list of frame numbers for display
fn summarize(numbers: &[u32]) -> String {
    const SHOWN: usize = 8;
    let mut text = numbers
        .iter()
        .take(SHOWN)
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if numbers.len() > SHOWN {
        text.push_str(&format!(", ... ({} more)", numbers.len() - SHOWN));
    }
    text
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let reports = scan_all(config)?;
    if reports.is_empty() {
        println!("No sequences configured.");
        return Ok(());
    }

    let mut inconsistent = 0;
    for report in &reports {
        let mark = if report.is_consistent() { "ok" } else { "MISMATCH" };
        println!(
            "{} [{}] {}/{} frames in {}",
            report.name,
            mark,
            report.found,
            report.declared,
            report.directory.display()
        );
        if !report.missing.is_empty() {
            println!("    missing: {}", summarize(&report.missing));
        }
        if !report.extra.is_empty() {
            println!("    beyond frame count: {}", summarize(&report.extra));
        }
        if !report.malformed.is_empty() {
            println!("    misnamed: {}", report.malformed.join(", "));
        }
        if !report.is_consistent() {
            inconsistent += 1;
        }
    }

    println!("\n{} of {} sequences consistent", reports.len() - inconsistent, reports.len());

    for report in &reports {
        enforce_layout(report, config.general.strict_assets)?;
    }
    Ok(())
}
