/// Parser configuration and activity presets.
///
/// Every pipeline stage receives its thresholds from a `ParserConfig` value;
/// there is no module-level state.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Cycling,
    Running,
    Mixed,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Cycling => "cycling",
            ActivityType::Running => "running",
            ActivityType::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds that differ between disciplines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub activity_type: ActivityType,
    pub min_climb_grade: f64,
    pub min_climb_distance: f64,
    pub avg_speed_threshold: f64,
    pub technical_descent_threshold: f64,
}

impl ActivityConfig {
    pub fn cycling() -> Self {
        ActivityConfig {
            activity_type: ActivityType::Cycling,
            min_climb_grade: 3.0,
            min_climb_distance: 0.5,
            avg_speed_threshold: 8.0,
            technical_descent_threshold: -8.0,
        }
    }

    /// Runners feel gentler and shorter rises, so everything is more sensitive.
    pub fn running() -> Self {
        ActivityConfig {
            activity_type: ActivityType::Running,
            min_climb_grade: 2.0,
            min_climb_distance: 0.2,
            avg_speed_threshold: 8.0,
            technical_descent_threshold: -5.0,
        }
    }

    pub fn mixed() -> Self {
        ActivityConfig {
            activity_type: ActivityType::Mixed,
            min_climb_grade: 2.5,
            min_climb_distance: 0.3,
            avg_speed_threshold: 8.0,
            technical_descent_threshold: -6.5,
        }
    }

    pub fn for_activity(activity_type: ActivityType) -> Self {
        match activity_type {
            ActivityType::Cycling => Self::cycling(),
            ActivityType::Running => Self::running(),
            ActivityType::Mixed => Self::mixed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Grade (%) that opens a climb.
    pub min_climb_grade: f64,
    /// Shortest climb (miles) that is reported.
    pub min_climb_distance: f64,
    /// Grade (%) that opens a technical descent.
    pub descent_threshold: f64,
    /// Grade (%) a descent must stay at or below to keep extending.
    pub descent_continuation_threshold: f64,
    pub min_descent_length: f64,
    /// Centered moving-average window, in points.
    pub smoothing_window: usize,
    pub quality_penalty_factor: f64,
    pub coordinate_validation_penalty: f64,
    pub max_distance_jump_miles: f64,

    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_elevation_ft: f64,
    pub max_elevation_ft: f64,

    /// Points closer than this (degrees) to (0, 0) are treated as GPS loss.
    pub gps_loss_epsilon_deg: f64,
    /// Distance (miles) credited for a step whose endpoints are out of range.
    pub fallback_step_miles: f64,
    pub avg_speed_threshold: f64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            min_climb_grade: 3.0,
            min_climb_distance: 0.5,
            descent_threshold: -8.0,
            descent_continuation_threshold: -3.0,
            min_descent_length: 0.2,
            smoothing_window: 5,
            quality_penalty_factor: 50.0,
            coordinate_validation_penalty: 20.0,
            max_distance_jump_miles: 1.0,
            min_latitude: -90.0,
            max_latitude: 90.0,
            min_longitude: -180.0,
            max_longitude: 180.0,
            min_elevation_ft: -1000.0,
            max_elevation_ft: 30000.0,
            gps_loss_epsilon_deg: 0.0001,
            fallback_step_miles: 0.01,
            avg_speed_threshold: 8.0,
        }
    }
}

impl ParserConfig {
    /// Load a config from a JSON document; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Copy of this config with the climb and descent thresholds of `activity`.
    ///
    /// A preset only fills a threshold still at its default value; anything
    /// the caller configured is kept.
    pub fn for_activity(&self, activity: ActivityType) -> Self {
        let preset = ActivityConfig::for_activity(activity);
        let defaults = ParserConfig::default();
        let pick = |configured: f64, default: f64, preset: f64| {
            if configured == default {
                preset
            } else {
                configured
            }
        };
        ParserConfig {
            min_climb_grade: pick(self.min_climb_grade, defaults.min_climb_grade, preset.min_climb_grade),
            min_climb_distance: pick(
                self.min_climb_distance,
                defaults.min_climb_distance,
                preset.min_climb_distance,
            ),
            descent_threshold: pick(
                self.descent_threshold,
                defaults.descent_threshold,
                preset.technical_descent_threshold,
            ),
            avg_speed_threshold: pick(
                self.avg_speed_threshold,
                defaults.avg_speed_threshold,
                preset.avg_speed_threshold,
            ),
            ..self.clone()
        }
    }

    pub fn latitude_in_range(&self, latitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
    }

    pub fn longitude_in_range(&self, longitude: f64) -> bool {
        (self.min_longitude..=self.max_longitude).contains(&longitude)
    }

    pub fn elevation_in_range(&self, elevation_ft: f64) -> bool {
        (self.min_elevation_ft..=self.max_elevation_ft).contains(&elevation_ft)
    }
}
