/// Track ingestion
///
/// Reads GPX tracks with the `gpx` crate and turns the raw samples into
/// distance-annotated `GeoPoint`s. Out-of-range fixes never abort the parse;
/// the step is credited a small fallback distance and flagged instead.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use geo::{point, HaversineDistance};
use log::{debug, warn};

use crate::config::ParserConfig;
use crate::coordinate_validator::is_gps_loss;
use crate::course::GeoPoint;
use crate::error::{CourseError, Result};

pub const FEET_PER_METER: f64 = 3.28084;
pub const METERS_PER_MILE: f64 = 1609.344;

/// A sample exactly as it came out of the track file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_meters: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

impl RawPoint {
    pub fn new(latitude: f64, longitude: f64, elevation_meters: Option<f64>) -> Self {
        RawPoint {
            latitude,
            longitude,
            elevation_meters,
            time: None,
        }
    }
}

/// Points of every track segment in document order, plus the first track's name.
#[derive(Debug, Clone, PartialEq)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub points: Vec<RawPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestedTrack {
    pub points: Vec<GeoPoint>,
    pub missing_elevation_points: usize,
    /// Indices of points whose incoming step used the fallback distance.
    pub fallback_steps: Vec<usize>,
}

pub fn read_gpx_file(path: &Path) -> Result<GpxTrack> {
    let file = File::open(path)?;
    read_gpx(BufReader::new(file))
}

pub fn read_gpx_str(contents: &str) -> Result<GpxTrack> {
    read_gpx(contents.as_bytes())
}

/// Collect every track point, segments concatenated in document order.
pub fn read_gpx<R: Read>(reader: R) -> Result<GpxTrack> {
    let gpx = gpx::read(reader).map_err(|e| CourseError::Parse(e.to_string()))?;

    let segment_count: usize = gpx.tracks.iter().map(|t| t.segments.len()).sum();
    if segment_count == 0 {
        return Err(CourseError::Parse("no track segments found".to_string()));
    }

    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                let location = waypoint.point();
                points.push(RawPoint {
                    latitude: location.y(),
                    longitude: location.x(),
                    elevation_meters: waypoint.elevation,
                    time: waypoint.time.as_ref().and_then(to_utc),
                });
            }
        }
    }

    if points.is_empty() {
        return Err(CourseError::EmptyTrack);
    }

    debug!("Read {} track points from {} segments", points.len(), segment_count);
    let name = gpx
        .tracks
        .first()
        .and_then(|t| t.name.clone())
        .filter(|n| !n.trim().is_empty());
    Ok(GpxTrack { name, points })
}

fn to_utc(time: &gpx::Time) -> Option<DateTime<Utc>> {
    time.format().ok()?.parse::<DateTime<Utc>>().ok()
}

/// Great-circle distance between two fixes, in miles.
pub fn haversine_miles(from: (f64, f64), to: (f64, f64)) -> f64 {
    let a = point!(x: from.1, y: from.0);
    let b = point!(x: to.1, y: to.0);
    a.haversine_distance(&b) / METERS_PER_MILE
}

/// Convert raw samples into cumulative-distance points. Grades are left unset.
pub fn ingest(raw: &[RawPoint], config: &ParserConfig) -> Result<IngestedTrack> {
    if raw.is_empty() {
        return Err(CourseError::EmptyTrack);
    }

    let mut points = Vec::with_capacity(raw.len());
    let mut missing_elevation_points = 0;
    let mut fallback_steps = Vec::new();
    let mut total_miles = 0.0;

    for (i, sample) in raw.iter().enumerate() {
        if sample.elevation_meters.is_none() {
            missing_elevation_points += 1;
        }

        if i > 0 {
            let prev = &raw[i - 1];
            if in_range(prev, config) && in_range(sample, config) {
                total_miles += haversine_miles(
                    (prev.latitude, prev.longitude),
                    (sample.latitude, sample.longitude),
                );
            } else {
                warn!(
                    "Point {}: coordinates out of range ({}, {}), using fallback distance {} mi",
                    i, sample.latitude, sample.longitude, config.fallback_step_miles
                );
                total_miles += config.fallback_step_miles;
                fallback_steps.push(i);
            }
        }

        points.push(GeoPoint {
            latitude: sample.latitude,
            longitude: sample.longitude,
            elevation_ft: sample.elevation_meters.map(|m| m * FEET_PER_METER),
            distance_miles: total_miles,
            grade_percent: None,
            time: sample.time,
        });
    }

    Ok(IngestedTrack {
        points,
        missing_elevation_points,
        fallback_steps,
    })
}

/// Usable for distance: finite, within bounds and not a lost fix at (0, 0).
fn in_range(sample: &RawPoint, config: &ParserConfig) -> bool {
    sample.latitude.is_finite()
        && sample.longitude.is_finite()
        && config.latitude_in_range(sample.latitude)
        && config.longitude_in_range(sample.longitude)
        && !is_gps_loss(sample.latitude, sample.longitude, config)
}
