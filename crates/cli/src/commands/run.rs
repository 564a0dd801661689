//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        info!(port = %port, "Overriding pub/sub port from CLI");
        blueprint.network.port = port;
    }

    info!(
        port = blueprint.network.port,
        downsample_factor = blueprint.stream.downsample_factor,
        capturers = blueprint.capturers.len(),
        cropping = blueprint.mirror.cropping_enabled,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_ticks: if args.max_ticks == 0 {
            None
        } else {
            Some(args.max_ticks)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        tick_rate_hz: args.tick_rate,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        ticks = stats.ticks,
                        frames_published = stats.frames_published,
                        messages_dropped = stats.messages_dropped,
                        duration_secs = stats.duration.as_secs_f64(),
                        fps = format!("{:.2}", stats.fps()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("PBM Streamer finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::StreamBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Network:");
    println!("  Port: {}", blueprint.network.port);
    println!(
        "  Size broadcast interval: {}s",
        blueprint.network.size_broadcast_interval_s
    );

    println!("\nStream:");
    println!("  Downsample factor: {}", blueprint.stream.downsample_factor);
    println!("  Pixel format: {:?}", blueprint.stream.pixel_format);

    println!("\nCapturers ({}):", blueprint.capturers.len());
    for capturer in &blueprint.capturers {
        let state = if capturer.enabled {
            "enabled"
        } else {
            "disabled"
        };
        println!(
            "  - {} ({}, {}x{}, focal {})",
            capturer.id,
            state,
            capturer.intrinsics.sensor_width,
            capturer.intrinsics.sensor_height,
            capturer.intrinsics.focal_length
        );
    }

    let mirror = &blueprint.mirror;
    println!("\nMirror Defaults:");
    println!("  Cropping: {}", mirror.cropping_enabled);
    println!("  Crop size: {}", mirror.crop_size);
    println!("  Transparency: {}", mirror.transparency);
    println!("  Border size: {}", mirror.border_size);

    println!();
}
