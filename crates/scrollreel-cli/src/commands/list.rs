use anyhow::Result;
use serde::Serialize;

use scrollreel_core::config::SectionConfig;
use scrollreel_core::AppConfig;

#[derive(Serialize)]
struct SectionRow<'a> {
    index: usize,
    kind: &'static str,
    name: &'a str,
    /// Height in viewport heights
    height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lazy: Option<bool>,
}

fn rows(config: &AppConfig) -> Vec<SectionRow<'_>> {
    config
        .page
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| match section {
            SectionConfig::Static(s) => SectionRow {
                index,
                kind: "static",
                name: &s.label,
                height: s.height,
                frame_count: None,
                pin_distance: None,
                lazy: None,
            },
            SectionConfig::Sequence(s) => SectionRow {
                index,
                kind: "sequence",
                name: &s.name,
                height: 1.0 + s.pin_distance,
                frame_count: Some(s.frame_count),
                pin_distance: Some(s.pin_distance),
                lazy: Some(s.lazy),
            },
        })
        .collect()
}

pub async fn run(config: &AppConfig, json: bool) -> Result<()> {
    let rows = rows(config);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No sections configured.");
        println!("\nAdd [[page.sections]] entries to {}", AppConfig::config_path().display());
        return Ok(());
    }

    println!("Sections ({}):\n", rows.len());
    for row in &rows {
        match (row.frame_count, row.pin_distance) {
            (Some(frames), Some(pin)) => {
                let lazy = if row.lazy == Some(true) { ", lazy" } else { "" };
                println!(
                    "  {}. {} - sequence, {} frames, pinned for {:.2} vh{}",
                    row.index + 1,
                    row.name,
                    frames,
                    pin,
                    lazy
                );
            }
            _ => println!("  {}. {} - static, {:.2} vh", row.index + 1, row.name, row.height),
        }
    }

    Ok(())
}
