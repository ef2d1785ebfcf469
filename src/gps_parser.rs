/// GPS parsing pipeline
///
/// Ties the stages together: ingest, detect activity, grade, validate, find
/// climbs and technical sections, and assemble a `CourseProfile`.

use std::path::Path;

use log::info;

use crate::activity::{detect_activity, ActivityEstimate};
use crate::climb_detector::detect_climbs;
use crate::config::{ActivityType, ParserConfig};
use crate::coordinate_validator::validate;
use crate::course::{Bounds, CourseProfile, GeoPoint, GpsMetadata};
use crate::elevation_smoother::with_grades;
use crate::error::Result;
use crate::technical_detector::detect_technical_sections;
use crate::track_ingestor::{ingest, read_gpx_file, read_gpx_str, RawPoint};

#[derive(Debug, Clone)]
pub struct GpsParser {
    config: ParserConfig,
    manual_activity: Option<ActivityType>,
    apply_presets: bool,
}

impl Default for GpsParser {
    fn default() -> Self {
        GpsParser::new(ParserConfig::default())
    }
}

impl GpsParser {
    pub fn new(config: ParserConfig) -> Self {
        GpsParser {
            config,
            manual_activity: None,
            apply_presets: true,
        }
    }

    /// Skip detection and treat every track as `activity`.
    pub fn with_activity(mut self, activity: ActivityType) -> Self {
        self.manual_activity = Some(activity);
        self
    }

    /// Ignore the activity presets entirely, even for thresholds left at
    /// their defaults.
    pub fn without_activity_presets(mut self) -> Self {
        self.apply_presets = false;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse_gpx_file(&self, path: &Path) -> Result<CourseProfile> {
        let track = read_gpx_file(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        let name = track
            .name
            .unwrap_or_else(|| format!("GPX Course from {}", file_name));
        self.build_profile(&name, &track.points, Some(path.display().to_string()))
    }

    /// Parse GPX text; `fallback_name` is used when the track has no name.
    pub fn parse_gpx_str(&self, fallback_name: &str, contents: &str) -> Result<CourseProfile> {
        let track = read_gpx_str(contents)?;
        let name = track.name.unwrap_or_else(|| fallback_name.to_string());
        self.build_profile(&name, &track.points, None)
    }

    pub fn parse_points(&self, name: &str, raw: &[RawPoint]) -> Result<CourseProfile> {
        self.build_profile(name, raw, None)
    }

    fn build_profile(&self, name: &str, raw: &[RawPoint], source: Option<String>) -> Result<CourseProfile> {
        info!(
            "Processing {} GPS points from {}",
            raw.len(),
            source.as_deref().unwrap_or(name)
        );
        let ingested = ingest(raw, &self.config)?;

        let estimate = match self.manual_activity {
            Some(activity) => ActivityEstimate::manual(activity),
            None => detect_activity(&ingested.points, self.config.avg_speed_threshold),
        };
        let config = if self.apply_presets {
            self.config.for_activity(estimate.activity_type)
        } else {
            self.config.clone()
        };
        info!(
            "Activity: {} (confidence {:.2}, {:.1} mph)",
            estimate.activity_type, estimate.confidence, estimate.avg_speed_mph
        );

        let points = with_grades(ingested.points, config.smoothing_window);
        let quality = validate(&points, ingested.fallback_steps.len(), &config);
        let climbs = detect_climbs(&points, &config);
        let technical_sections = detect_technical_sections(&points, &config);

        let distance = points.last().map(|p| p.distance_miles).unwrap_or(0.0);
        let gain = total_elevation_gain(&points);
        let altitude = base_altitude_ft(&points);

        info!(
            "{}: {:.1} mi, {:.0} ft gain, {} climbs, {} technical sections, quality {:.1}",
            name,
            distance,
            gain,
            climbs.len(),
            technical_sections.len(),
            quality.quality_score
        );

        let metadata = GpsMetadata {
            source,
            total_points: points.len(),
            missing_elevation_points: ingested.missing_elevation_points,
            smoothed: config.smoothing_window > 1,
            bounds: Bounds::from_points(&points),
            quality,
        };

        let mut profile = CourseProfile::new(name, estimate.activity_type, distance, gain)
            .with_climbs(climbs)
            .with_technical_sections(technical_sections)
            .with_altitude(altitude)
            .with_points(points)
            .with_metadata(metadata);
        profile.activity_confidence = estimate.confidence;
        Ok(profile)
    }
}

/// Sum of positive steps between consecutive known elevations.
pub fn total_elevation_gain(points: &[GeoPoint]) -> f64 {
    let elevations: Vec<f64> = points.iter().filter_map(|p| p.elevation_ft).collect();
    elevations
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .sum()
}

/// Lowest known elevation, rounded to the foot.
pub fn base_altitude_ft(points: &[GeoPoint]) -> f64 {
    points
        .iter()
        .filter_map(|p| p.elevation_ft)
        .min_by(|a, b| a.total_cmp(b))
        .map(f64::round)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CourseError;

    fn ramp(count: usize, lat_step: f64, meters_per_point: f64) -> Vec<RawPoint> {
        (0..count)
            .map(|i| RawPoint::new(40.0 + i as f64 * lat_step, -105.0, Some(1500.0 + i as f64 * meters_per_point)))
            .collect()
    }

    #[test]
    fn test_total_elevation_gain_skips_missing() {
        let points = vec![
            GeoPoint::new(40.0, -105.0, Some(100.0), 0.0),
            GeoPoint::new(40.0, -105.0, None, 0.1),
            GeoPoint::new(40.0, -105.0, Some(150.0), 0.2),
            GeoPoint::new(40.0, -105.0, Some(120.0), 0.3),
            GeoPoint::new(40.0, -105.0, Some(130.0), 0.4),
        ];
        assert_eq!(total_elevation_gain(&points), 60.0);
        assert_eq!(base_altitude_ft(&points), 100.0);
    }

    #[test]
    fn test_parse_points_builds_profile() {
        // about 0.069 mi per step, climbing 10 m per step (~9% grade), then flat
        let mut raw = ramp(40, 0.001, 10.0);
        raw.extend((0..10).map(|i| RawPoint::new(40.04 + i as f64 * 0.001, -105.0, Some(1890.0))));
        let parser = GpsParser::default().with_activity(ActivityType::Cycling);
        let course = parser.parse_points("Ramp", &raw).unwrap();

        assert_eq!(course.name, "Ramp");
        assert_eq!(course.activity_type, ActivityType::Cycling);
        assert_eq!(course.activity_confidence, 1.0);
        assert!(course.distance_miles() > 3.0);
        assert!(course.elevation_gain_ft() > 1200.0);
        assert_eq!(course.climbs.len(), 1);
        assert_eq!(course.points.len(), 50);
        assert!((course.altitude_ft - 4921.0).abs() < 1.0);

        let metadata = course.metadata.as_ref().unwrap();
        assert_eq!(metadata.total_points, 50);
        assert_eq!(metadata.quality.quality_score, 100.0);
        assert!(metadata.smoothed);
    }

    #[test]
    fn test_running_override_fills_run_fields() {
        let raw = ramp(20, 0.001, 1.0);
        let course = GpsParser::default()
            .with_activity(ActivityType::Running)
            .parse_points("Run", &raw)
            .unwrap();
        assert_eq!(course.bike_distance_miles, 0.0);
        assert!(course.run_distance_miles > 1.0);
    }

    #[test]
    fn test_configured_climb_grade_is_respected() {
        // about 0.069 mi per step at a steady 4% grade
        let raw = ramp(30, 0.001, 4.0 * 0.069 * 1609.344 / 100.0);
        let config = ParserConfig {
            min_climb_grade: 4.5,
            ..ParserConfig::default()
        };
        let strict = GpsParser::new(config).parse_points("Ramp", &raw).unwrap();
        assert!(strict.climbs.iter().all(|c| c.avg_grade >= 4.5));
        assert!(strict.climbs.is_empty());

        let relaxed = GpsParser::default().parse_points("Ramp", &raw).unwrap();
        assert_eq!(relaxed.climbs.len(), 1);
    }

    #[test]
    fn test_empty_input_fails() {
        let result = GpsParser::default().parse_points("Nothing", &[]);
        assert!(matches!(result, Err(CourseError::EmptyTrack)));
    }

    #[test]
    fn test_unnamed_track_uses_fallback_name() {
        let gpx = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="40.000" lon="-105.0"><ele>1600</ele></trkpt>
    <trkpt lat="40.001" lon="-105.0"><ele>1601</ele></trkpt>
  </trkseg></trk>
</gpx>"#;
        let course = GpsParser::default().parse_gpx_str("Fallback", gpx).unwrap();
        assert_eq!(course.name, "Fallback");
        assert_eq!(course.points.len(), 2);
    }
}
