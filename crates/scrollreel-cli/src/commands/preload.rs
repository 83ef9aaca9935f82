use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;

use scrollreel_core::config::SourceKind;
use scrollreel_core::frames::{source_from_config, LoadPolicy};
use scrollreel_core::sequence::SequenceDescriptor;
use scrollreel_core::AppConfig;

pub async fn run(config: &AppConfig, count: u32) -> Result<()> {
    if config.loader.source != SourceKind::Http {
        println!("Frames are read from {}; nothing to preload.", config.assets_dir().display());
        return Ok(());
    }
    if !config.loader.disk_cache {
        println!("loader.disk_cache is off; preloaded frames would not be kept.");
        return Ok(());
    }

    let source = source_from_config(config)?;
    let policy = LoadPolicy::from_config(&config.loader);
    let mut total_ok = 0u32;
    let mut total_failed = 0u32;

    for section in config.sequences() {
        let descriptor = Arc::new(SequenceDescriptor::from_section(section)?);
        let wanted = count.min(descriptor.frame_count());

        let mut ok = 0u32;
        let mut failed = 0u32;
        // same windows the player uses, cut at `wanted`
        for batch in policy.batches(wanted) {
            let mut tasks = JoinSet::new();
            for index in batch {
                let source = Arc::clone(&source);
                let descriptor = Arc::clone(&descriptor);
                tasks.spawn(async move { (index, source.warm(&descriptor, index).await) });
            }
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => ok += 1,
                    Ok((index, Err(e))) => {
                        failed += 1;
                        tracing::warn!(sequence = %descriptor.name(), index, error = %e, "Preload failed");
                    }
                    Err(e) => {
                        failed += 1;
                        tracing::warn!(sequence = %descriptor.name(), error = %e, "Preload task aborted");
                    }
                }
            }
        }

        println!("  {} - {}/{} frames cached", descriptor.name(), ok, wanted);
        total_ok += ok;
        total_failed += failed;
    }

    println!(
        "\nPreloaded {} frames into {} ({} failed)",
        total_ok,
        config.frame_cache_dir().display(),
        total_failed
    );
    Ok(())
}
