//! Generation parameters and their boundary validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller-supplied generation parameters.
///
/// The core treats a well-formed config as a contract: [`DungeonConfig::validate`]
/// exists for the boundary (CLI, config files), and generation itself performs
/// no per-step arithmetic checks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonConfig {
    /// Side length of the starting square region.
    pub total_size: i32,
    /// Split depth; the finished tree has `2^iterations` leaves.
    pub iterations: u32,
    /// Fraction of a leaf region occupied by its room, sampled per axis.
    pub room_min_ratio: f32,
    pub room_max_ratio: f32,
    /// Fraction of a region's long axis given to the first child of a split.
    pub split_min_ratio: f32,
    pub split_max_ratio: f32,
    /// Corridor thickness.
    pub tunnel_width: i32,
    /// Clearance kept between a corridor and the edges it runs along.
    pub padding: i32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            total_size: 12,
            iterations: 1,
            room_min_ratio: 0.5,
            room_max_ratio: 1.0,
            split_min_ratio: 0.4,
            split_max_ratio: 0.6,
            tunnel_width: 3,
            padding: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("total_size must be positive, got {0}")]
    TotalSize(i32),
    #[error("tunnel_width must be positive, got {0}")]
    TunnelWidth(i32),
    #[error("padding must be non-negative, got {0}")]
    Padding(i32),
    #[error("{name} ratios must satisfy 0 < min <= max <= 1, got [{min}, {max}]")]
    RatioRange { name: &'static str, min: f32, max: f32 },
    #[error(
        "iterations={iterations} can shrink regions below one unit for \
         total_size={total_size} and split_min_ratio={split_min_ratio}"
    )]
    DegenerateRegions { total_size: i32, iterations: u32, split_min_ratio: f32 },
}

impl DungeonConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_size <= 0 {
            return Err(ConfigError::TotalSize(self.total_size));
        }
        if self.tunnel_width <= 0 {
            return Err(ConfigError::TunnelWidth(self.tunnel_width));
        }
        if self.padding < 0 {
            return Err(ConfigError::Padding(self.padding));
        }
        check_ratio_range("room", self.room_min_ratio, self.room_max_ratio)?;
        check_ratio_range("split", self.split_min_ratio, self.split_max_ratio)?;

        // Worst case every split hands the smaller share to the same lineage.
        let smallest_extent =
            self.total_size as f32 * self.split_min_ratio.powi(self.iterations as i32);
        if smallest_extent < 1.0 {
            return Err(ConfigError::DegenerateRegions {
                total_size: self.total_size,
                iterations: self.iterations,
                split_min_ratio: self.split_min_ratio,
            });
        }

        Ok(())
    }
}

fn check_ratio_range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= 0.0 || max > 1.0 || min > max {
        return Err(ConfigError::RatioRange { name, min, max });
    }
    Ok(())
}
