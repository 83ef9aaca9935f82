use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

use scrollreel_core::sequence::{FrameLayout, SEQUENCE_DIR};
use scrollreel_core::AppConfig;

pub struct ExtractOptions {
    pub fps: u32,
    pub width: u32,
    /// Seconds
    pub duration: f64,
    pub quality: u8,
    pub force: bool,
}

/// ffmpeg arguments turning `input` into numbered WebP frames under `output_dir`
fn ffmpeg_args(input: &Path, output_dir: &Path, layout: &FrameLayout, options: &ExtractOptions) -> Vec<String> {
    let pattern = format!("{}%0{}d.{}", layout.prefix, layout.pad, layout.ext);
    vec![
        "-i".to_string(),
        input.display().to_string(),
        "-t".to_string(),
        options.duration.to_string(),
        "-vf".to_string(),
        format!("fps={},scale={}:-1", options.fps, options.width),
        "-an".to_string(),
        "-c:v".to_string(),
        "libwebp".to_string(),
        "-quality".to_string(),
        options.quality.to_string(),
        "-start_number".to_string(),
        "1".to_string(),
        output_dir.join(pattern).display().to_string(),
        "-y".to_string(),
    ]
}

/// `.mp4` files in `dir`, sorted by name
fn find_videos(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut videos: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading video directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("mp4")))
        .collect();
    videos.sort();
    Ok(videos)
}

fn has_files(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

pub async fn run(config: &AppConfig, videos_dir: &Path, options: &ExtractOptions) -> Result<()> {
    if options.fps == 0 || options.width == 0 || options.duration <= 0.0 {
        bail!("fps, width and duration must be positive");
    }

    let videos = find_videos(videos_dir)?;
    if videos.is_empty() {
        println!("No .mp4 files in {}", videos_dir.display());
        return Ok(());
    }

    let output_base = config.assets_dir().join(SEQUENCE_DIR);
    fs::create_dir_all(&output_base)
        .with_context(|| format!("creating {}", output_base.display()))?;

    println!("Found {} videos to process.", videos.len());
    let mut failures = 0;

    for (i, video) in videos.iter().enumerate() {
        let Some(name) = video.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let position = format!("[{}/{}]", i + 1, videos.len());
        let output_dir = output_base.join(name);

        if !options.force && has_files(&output_dir) {
            println!("{} Skipping {} (already extracted)", position, name);
            continue;
        }
        fs::create_dir_all(&output_dir)?;

        // match the naming of the sequence section with this name, if any
        let layout = config
            .sequences()
            .find(|s| s.name == name)
            .map(|s| s.layout())
            .unwrap_or_default();

        println!("{} Extracting {}...", position, name);
        let args = ffmpeg_args(video, &output_dir, &layout, options);
        tracing::debug!(?args, "Running ffmpeg");

        let status = tokio::task::spawn_blocking(move || Command::new("ffmpeg").args(&args).status())
            .await?
            .context("running ffmpeg; is it installed and on PATH?")?;

        if status.success() {
            let count = fs::read_dir(&output_dir)?.count();
            println!("{} Done {} ({} frames)", position, name, count);
        } else {
            failures += 1;
            eprintln!("{} Failed {}: ffmpeg exited with {}", position, name, status);
        }
    }

    if failures > 0 {
        bail!("{} of {} videos failed to extract", failures, videos.len());
    }
    println!("All videos processed.");
    Ok(())
}
