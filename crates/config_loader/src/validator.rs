//! Configuration validation
//!
//! Rules:
//! - capturer ids unique and non-empty
//! - intrinsics positive, sensor larger than the guard band
//! - downsample_factor >= 1
//! - size_broadcast_interval_s > 0
//! - mirror settings within range

use std::collections::HashSet;

use contracts::{ContractError, StreamBlueprint, SENSOR_GUARD_BAND};

/// Validate a StreamBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &StreamBlueprint) -> Result<(), ContractError> {
    validate_network(blueprint)?;
    validate_stream(blueprint)?;
    validate_capturers(blueprint)?;
    blueprint.mirror.validate()?;
    Ok(())
}

fn validate_network(blueprint: &StreamBlueprint) -> Result<(), ContractError> {
    if blueprint.network.size_broadcast_interval_s <= 0.0 {
        return Err(ContractError::config_validation(
            "network.size_broadcast_interval_s",
            format!(
                "must be > 0, got {}",
                blueprint.network.size_broadcast_interval_s
            ),
        ));
    }
    Ok(())
}

fn validate_stream(blueprint: &StreamBlueprint) -> Result<(), ContractError> {
    if blueprint.stream.downsample_factor == 0 {
        return Err(ContractError::config_validation(
            "stream.downsample_factor",
            "must be >= 1",
        ));
    }
    Ok(())
}

fn validate_capturers(blueprint: &StreamBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for capturer in &blueprint.capturers {
        if capturer.id.is_empty() {
            return Err(ContractError::config_validation(
                "capturers[].id",
                "capturer id cannot be empty",
            ));
        }
        if !seen.insert(&capturer.id) {
            return Err(ContractError::config_validation(
                format!("capturers[id={}]", capturer.id),
                "duplicate capturer id",
            ));
        }

        let intr = &capturer.intrinsics;
        if intr.focal_length <= 0.0 {
            return Err(ContractError::config_validation(
                format!("capturers[{}].intrinsics.focal_length", capturer.id),
                format!("must be > 0, got {}", intr.focal_length),
            ));
        }
        if intr.sensor_width <= SENSOR_GUARD_BAND || intr.sensor_height <= SENSOR_GUARD_BAND {
            return Err(ContractError::config_validation(
                format!("capturers[{}].intrinsics", capturer.id),
                format!(
                    "sensor extent must exceed the guard band ({}), got {}x{}",
                    SENSOR_GUARD_BAND, intr.sensor_width, intr.sensor_height
                ),
            ));
        }
    }
    Ok(())
}
