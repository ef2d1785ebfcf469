/// Coordinate and continuity validation.
///
/// Checks each point for plausible coordinates and elevation and each step for
/// implausible jumps, then folds the counts into a 0-100 quality score.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::course::GeoPoint;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_points: usize,
    pub missing_elevation_points: usize,
    pub invalid_latitude_points: usize,
    pub invalid_longitude_points: usize,
    pub invalid_elevation_points: usize,
    pub large_distance_jumps: usize,
    /// Steps credited the fallback distance during ingestion.
    pub fallback_distance_steps: usize,
    pub total_validation_errors: usize,
    pub quality_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointIssues {
    pub invalid_latitude: bool,
    pub invalid_longitude: bool,
    pub invalid_elevation: bool,
}

/// A fix within epsilon of (0, 0) is a receiver that lost its lock.
pub fn is_gps_loss(latitude: f64, longitude: f64, config: &ParserConfig) -> bool {
    latitude.abs() < config.gps_loss_epsilon_deg && longitude.abs() < config.gps_loss_epsilon_deg
}

pub fn check_point(point: &GeoPoint, config: &ParserConfig) -> PointIssues {
    let gps_loss = is_gps_loss(point.latitude, point.longitude, config);
    PointIssues {
        invalid_latitude: gps_loss || !point.latitude.is_finite() || !config.latitude_in_range(point.latitude),
        invalid_longitude: gps_loss || !point.longitude.is_finite() || !config.longitude_in_range(point.longitude),
        invalid_elevation: point
            .elevation_ft
            .map(|e| !e.is_finite() || !config.elevation_in_range(e))
            .unwrap_or(false),
    }
}

pub fn quality_score(
    total_points: usize,
    missing_elevation_points: usize,
    total_validation_errors: usize,
    config: &ParserConfig,
) -> f64 {
    if total_points == 0 {
        return 0.0;
    }
    let n = total_points as f64;
    let score = 100.0
        - (missing_elevation_points as f64 / n) * config.quality_penalty_factor
        - (total_validation_errors as f64 / n) * config.coordinate_validation_penalty;
    score.clamp(0.0, 100.0)
}

pub fn validate(points: &[GeoPoint], fallback_distance_steps: usize, config: &ParserConfig) -> QualityReport {
    let mut report = QualityReport {
        total_points: points.len(),
        fallback_distance_steps,
        ..QualityReport::default()
    };

    for (i, point) in points.iter().enumerate() {
        if point.elevation_ft.is_none() {
            report.missing_elevation_points += 1;
        }

        let issues = check_point(point, config);
        if is_gps_loss(point.latitude, point.longitude, config) {
            warn!("Point {}: GPS signal loss at (0, 0)", i);
        } else {
            if issues.invalid_latitude {
                warn!("Point {}: invalid latitude {}", i, point.latitude);
            }
            if issues.invalid_longitude {
                warn!("Point {}: invalid longitude {}", i, point.longitude);
            }
        }
        if issues.invalid_elevation {
            warn!("Point {}: elevation {:?} ft out of bounds", i, point.elevation_ft);
        }
        report.invalid_latitude_points += issues.invalid_latitude as usize;
        report.invalid_longitude_points += issues.invalid_longitude as usize;
        report.invalid_elevation_points += issues.invalid_elevation as usize;

        if i > 0 {
            let step = point.distance_miles - points[i - 1].distance_miles;
            if step > config.max_distance_jump_miles {
                warn!("Point {}: large distance jump of {:.2} miles", i, step);
                report.large_distance_jumps += 1;
            }
        }
    }

    report.total_validation_errors = report.invalid_latitude_points
        + report.invalid_longitude_points
        + report.invalid_elevation_points
        + report.large_distance_jumps;
    report.quality_score = quality_score(
        report.total_points,
        report.missing_elevation_points,
        report.total_validation_errors,
        config,
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_track(n: usize) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| GeoPoint::new(40.0 + i as f64 * 0.001, -105.0, Some(5000.0), i as f64 * 0.07))
            .collect()
    }

    #[test]
    fn test_clean_track_scores_100() {
        let report = validate(&clean_track(20), 0, &ParserConfig::default());
        assert_eq!(report.total_validation_errors, 0);
        assert_eq!(report.quality_score, 100.0);
    }

    #[test]
    fn test_gps_loss_counts_both_axes() {
        let mut points = clean_track(10);
        points[4].latitude = 0.0;
        points[4].longitude = 0.00005;
        let report = validate(&points, 0, &ParserConfig::default());
        assert_eq!(report.invalid_latitude_points, 1);
        assert_eq!(report.invalid_longitude_points, 1);
        assert_eq!(report.total_validation_errors, 2);
        assert!((report.quality_score - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_large_jump() {
        let mut points = clean_track(10);
        for p in points.iter_mut().skip(5) {
            p.distance_miles += 2.0;
        }
        let report = validate(&points, 0, &ParserConfig::default());
        assert_eq!(report.large_distance_jumps, 1);
        assert!((report.quality_score - 98.0).abs() < 1e-9);
    }

    #[test]
    fn test_elevation_bounds() {
        let mut points = clean_track(4);
        points[0].elevation_ft = Some(-1500.0);
        points[1].elevation_ft = Some(31000.0);
        points[2].elevation_ft = None;
        let report = validate(&points, 0, &ParserConfig::default());
        assert_eq!(report.invalid_elevation_points, 2);
        assert_eq!(report.missing_elevation_points, 1);
    }

    #[test]
    fn test_all_missing_elevation_stays_in_bounds() {
        let mut points = clean_track(10);
        for p in points.iter_mut() {
            p.elevation_ft = None;
            p.latitude = 0.0;
            p.longitude = 0.0;
        }
        let report = validate(&points, 0, &ParserConfig::default());
        assert!(report.quality_score >= 0.0 && report.quality_score <= 100.0);
        assert!(!report.quality_score.is_nan());
        assert_eq!(report.quality_score, 10.0);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(quality_score(0, 0, 0, &ParserConfig::default()), 0.0);
    }
}
