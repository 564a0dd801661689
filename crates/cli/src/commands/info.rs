//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    network: NetworkInfo,
    stream: StreamInfo,
    mirror: MirrorInfo,
    capturers: Vec<CapturerInfo>,
}

#[derive(Serialize)]
struct NetworkInfo {
    port: u16,
    size_broadcast_interval_s: f32,
}

#[derive(Serialize)]
struct StreamInfo {
    downsample_factor: u32,
    pixel_format: String,
}

#[derive(Serialize)]
struct MirrorInfo {
    cropping_enabled: bool,
    crop_size: f32,
    transparency: f32,
    border_size: f32,
}

#[derive(Serialize)]
struct CapturerInfo {
    id: String,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    intrinsics: Option<IntrinsicsInfo>,
}

#[derive(Serialize)]
struct IntrinsicsInfo {
    sensor_width: f32,
    sensor_height: f32,
    focal_length: f32,
    vertical_fov_deg: f32,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::StreamBlueprint, args: &InfoArgs) -> ConfigInfo {
    let capturers = blueprint
        .capturers
        .iter()
        .map(|c| CapturerInfo {
            id: c.id.clone(),
            enabled: c.enabled,
            intrinsics: args.capturers.then(|| IntrinsicsInfo {
                sensor_width: c.intrinsics.sensor_width,
                sensor_height: c.intrinsics.sensor_height,
                focal_length: c.intrinsics.focal_length,
                vertical_fov_deg: c.intrinsics.vertical_fov().to_degrees(),
            }),
        })
        .collect();

    ConfigInfo {
        network: NetworkInfo {
            port: blueprint.network.port,
            size_broadcast_interval_s: blueprint.network.size_broadcast_interval_s,
        },
        stream: StreamInfo {
            downsample_factor: blueprint.stream.downsample_factor,
            pixel_format: format!("{:?}", blueprint.stream.pixel_format),
        },
        mirror: MirrorInfo {
            cropping_enabled: blueprint.mirror.cropping_enabled,
            crop_size: blueprint.mirror.crop_size,
            transparency: blueprint.mirror.transparency,
            border_size: blueprint.mirror.border_size,
        },
        capturers,
    }
}

fn print_config_info(blueprint: &contracts::StreamBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               PBM Streamer Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Network
    println!("📡 Network");
    println!("   ├─ Port: {}", blueprint.network.port);
    println!(
        "   └─ Size broadcast interval: {}s",
        blueprint.network.size_broadcast_interval_s
    );

    // Stream
    println!("\n🎞  Stream");
    println!(
        "   ├─ Downsample factor: {}",
        blueprint.stream.downsample_factor
    );
    println!("   └─ Pixel format: {:?}", blueprint.stream.pixel_format);

    // Mirror defaults
    let mirror = &blueprint.mirror;
    println!("\n🪞 Mirror Defaults");
    println!("   ├─ Cropping: {}", mirror.cropping_enabled);
    println!("   ├─ Crop size: {}", mirror.crop_size);
    println!("   ├─ Transparency: {}", mirror.transparency);
    println!("   └─ Border size: {}", mirror.border_size);

    // Capturers
    println!("\n📷 Capturers ({})", blueprint.capturers.len());
    for (i, capturer) in blueprint.capturers.iter().enumerate() {
        let is_last = i == blueprint.capturers.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let state = if capturer.enabled {
            "enabled"
        } else {
            "disabled"
        };
        println!("   {} {} ({})", prefix, capturer.id, state);

        if args.capturers {
            let intr = &capturer.intrinsics;
            println!(
                "   {}  ├─ Sensor: {}x{}, focal {}",
                child_prefix, intr.sensor_width, intr.sensor_height, intr.focal_length
            );
            println!(
                "   {}  └─ Vertical FOV: {:.1}°",
                child_prefix,
                intr.vertical_fov().to_degrees()
            );
        }
    }

    println!();
}
