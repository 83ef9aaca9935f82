use std::path::Path;

use anyhow::{anyhow, bail, Result};

use scrollreel_core::frames::source_from_config;
use scrollreel_core::render::{DrawOutcome, Renderer, Sampling, Surface};
use scrollreel_core::scroll::frame_for;
use scrollreel_core::sequence::SequenceDescriptor;
use scrollreel_core::AppConfig;

pub async fn run(
    config: &AppConfig,
    name: &str,
    progress: f64,
    width: u32,
    height: u32,
    output: &Path,
) -> Result<()> {
    if !(0.0..=1.0).contains(&progress) {
        bail!("progress must be between 0.0 and 1.0, got {}", progress);
    }
    if width == 0 || height == 0 {
        bail!("output size must be non-zero, got {}x{}", width, height);
    }

    let section = config
        .sequences()
        .find(|s| s.name == name)
        .ok_or_else(|| anyhow!("No sequence named '{}' in the page config", name))?;
    let descriptor = SequenceDescriptor::from_section(section)?;

    let index = frame_for(progress, descriptor.frame_count());
    let source = source_from_config(config)?;
    tracing::info!(sequence = name, progress, frame = index, "Rendering frame");

    let frame = source.fetch(&descriptor, index).await?;
    let mut surface = Surface::new(width, height);
    match Renderer::new(Sampling::Triangle).draw_frame(&frame, &mut surface) {
        DrawOutcome::Drawn => {}
        outcome => bail!("Frame {} could not be drawn: {:?}", index, outcome),
    }
    surface.save(output)?;

    println!(
        "Rendered {} frame {}/{} ({}) to {}",
        name,
        index + 1,
        descriptor.frame_count(),
        source.locate(&descriptor, index),
        output.display()
    );
    Ok(())
}
