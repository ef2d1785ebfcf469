/// Course data model shared by every stage of the pipeline.
///
/// All values are built once per analysis run and never mutated afterwards;
/// later stages only borrow them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ActivityType;
use crate::coordinate_validator::QualityReport;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One sample of the ingested track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// `None` when the source point carried no elevation.
    pub elevation_ft: Option<f64>,
    /// Cumulative, never decreasing.
    pub distance_miles: f64,
    /// `None` for the first point and for zero-length steps.
    pub grade_percent: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, elevation_ft: Option<f64>, distance_miles: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
            elevation_ft,
            distance_miles,
            grade_percent: None,
            time: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbSegment {
    pub name: String,
    pub start_mile: f64,
    pub length_miles: f64,
    pub avg_grade: f64,
    pub max_grade: f64,
    pub elevation_gain_ft: f64,
    pub start_coord: Option<Coordinate>,
    pub end_coord: Option<Coordinate>,
    pub points: Vec<GeoPoint>,
}

impl ClimbSegment {
    /// A climb known only by its summary numbers, e.g. from a race guide.
    pub fn new(
        name: &str,
        start_mile: f64,
        length_miles: f64,
        avg_grade: f64,
        max_grade: f64,
        elevation_gain_ft: f64,
    ) -> Self {
        ClimbSegment {
            name: name.to_string(),
            start_mile,
            length_miles,
            avg_grade,
            max_grade,
            elevation_gain_ft,
            start_coord: None,
            end_coord: None,
            points: Vec::new(),
        }
    }

    pub fn end_mile(&self) -> f64 {
        self.start_mile + self.length_miles
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalKind {
    SteepDescent,
    /// Anything described by hand: switchbacks, narrow roads, sharp turns.
    Other,
}

const TECHNICAL_KEYWORDS: [&str; 4] = ["switchback", "technical", "narrow", "sharp"];

/// A hazardous stretch of course.
///
/// The numbers are stored alongside the human-readable description so that
/// consumers never have to parse them back out of the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSection {
    pub kind: TechnicalKind,
    pub start_mile: Option<f64>,
    pub length_miles: Option<f64>,
    pub grade_percent: Option<f64>,
    pub description: String,
}

impl TechnicalSection {
    pub fn steep_descent(start_mile: f64, length_miles: f64, grade_percent: f64) -> Self {
        TechnicalSection {
            kind: TechnicalKind::SteepDescent,
            start_mile: Some(start_mile),
            length_miles: Some(length_miles),
            grade_percent: Some(grade_percent),
            description: format!(
                "Steep descent at mile {:.1} ({:.1}mi, {:.1}% grade)",
                start_mile, length_miles, grade_percent
            ),
        }
    }

    /// Build a section from free text such as `"Narrow descent at mile 45 (-12% grade)"`.
    ///
    /// The mile marker and grade are read once here, at the edge of the system.
    pub fn from_description(description: &str) -> Self {
        let (start_mile, grade_percent) = scan_description(description);
        let lower = description.to_lowercase();
        let kind = if lower.contains("steep descent") {
            TechnicalKind::SteepDescent
        } else {
            TechnicalKind::Other
        };
        TechnicalSection {
            kind,
            start_mile,
            length_miles: None,
            grade_percent,
            description: description.to_string(),
        }
    }

    pub fn is_descent(&self) -> bool {
        self.kind == TechnicalKind::SteepDescent || self.description.to_lowercase().contains("descent")
    }

    pub fn has_technical_keyword(&self) -> bool {
        let lower = self.description.to_lowercase();
        TECHNICAL_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
    }
}

impl std::fmt::Display for TechnicalSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}

/// Pull "mile N" and "N%" out of a hand-written description.
fn scan_description(description: &str) -> (Option<f64>, Option<f64>) {
    let tokens: Vec<&str> = description
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let mut mile = None;
    let mut grade = None;
    for (i, token) in tokens.iter().enumerate() {
        if mile.is_none() && token.eq_ignore_ascii_case("mile") {
            mile = tokens.get(i + 1).and_then(|next| next.parse::<f64>().ok());
        }
        if grade.is_none() {
            if let Some(number) = token.strip_suffix('%') {
                grade = number.parse::<f64>().ok();
            }
        }
    }
    (mile, grade)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let initial = Bounds {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lon: first.longitude,
            max_lon: first.longitude,
        };
        Some(points.iter().fold(initial, |b, p| Bounds {
            min_lat: b.min_lat.min(p.latitude),
            max_lat: b.max_lat.max(p.latitude),
            min_lon: b.min_lon.min(p.longitude),
            max_lon: b.max_lon.max(p.longitude),
        }))
    }
}

/// Facts about the source track, attached to profiles built from GPS data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsMetadata {
    pub source: Option<String>,
    pub total_points: usize,
    pub missing_elevation_points: usize,
    pub smoothed: bool,
    pub bounds: Option<Bounds>,
    pub quality: QualityReport,
}

impl GpsMetadata {
    pub fn data_quality_score(&self) -> f64 {
        self.quality.quality_score
    }

    pub fn large_distance_jumps(&self) -> usize {
        self.quality.large_distance_jumps
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseProfile {
    pub name: String,
    pub activity_type: ActivityType,
    pub activity_confidence: f64,
    pub bike_distance_miles: f64,
    pub bike_elevation_gain_ft: f64,
    pub run_distance_miles: f64,
    pub run_elevation_gain_ft: f64,
    pub swim_distance_miles: f64,
    /// Base altitude of the course.
    pub altitude_ft: f64,
    pub climbs: Vec<ClimbSegment>,
    pub technical_sections: Vec<TechnicalSection>,
    pub points: Vec<GeoPoint>,
    pub start_coord: Option<Coordinate>,
    pub finish_coord: Option<Coordinate>,
    pub metadata: Option<GpsMetadata>,
}

impl CourseProfile {
    /// A profile with the discipline fields filled in for `activity_type`.
    pub fn new(name: &str, activity_type: ActivityType, distance_miles: f64, elevation_gain_ft: f64) -> Self {
        let (bike, run) = match activity_type {
            ActivityType::Cycling => ((distance_miles, elevation_gain_ft), (0.0, 0.0)),
            ActivityType::Running => ((0.0, 0.0), (distance_miles, elevation_gain_ft)),
            ActivityType::Mixed => ((distance_miles, elevation_gain_ft), (distance_miles, elevation_gain_ft)),
        };
        CourseProfile {
            name: name.to_string(),
            activity_type,
            activity_confidence: 1.0,
            bike_distance_miles: bike.0,
            bike_elevation_gain_ft: bike.1,
            run_distance_miles: run.0,
            run_elevation_gain_ft: run.1,
            swim_distance_miles: 0.0,
            altitude_ft: 0.0,
            climbs: Vec::new(),
            technical_sections: Vec::new(),
            points: Vec::new(),
            start_coord: None,
            finish_coord: None,
            metadata: None,
        }
    }

    pub fn with_climbs(mut self, climbs: Vec<ClimbSegment>) -> Self {
        self.climbs = climbs;
        self
    }

    pub fn with_technical_sections(mut self, sections: Vec<TechnicalSection>) -> Self {
        self.technical_sections = sections;
        self
    }

    pub fn with_altitude(mut self, altitude_ft: f64) -> Self {
        self.altitude_ft = altitude_ft;
        self
    }

    pub fn with_points(mut self, points: Vec<GeoPoint>) -> Self {
        self.start_coord = points.first().map(GeoPoint::coordinate);
        self.finish_coord = points.last().map(GeoPoint::coordinate);
        self.points = points;
        self
    }

    pub fn with_metadata(mut self, metadata: GpsMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Distance of the discipline this course describes.
    pub fn distance_miles(&self) -> f64 {
        match self.activity_type {
            ActivityType::Cycling => self.bike_distance_miles,
            ActivityType::Running => self.run_distance_miles,
            ActivityType::Mixed => self.bike_distance_miles.max(self.run_distance_miles),
        }
    }

    pub fn elevation_gain_ft(&self) -> f64 {
        match self.activity_type {
            ActivityType::Cycling => self.bike_elevation_gain_ft,
            ActivityType::Running => self.run_elevation_gain_ft,
            ActivityType::Mixed => {
                if self.bike_distance_miles >= self.run_distance_miles {
                    self.bike_elevation_gain_ft
                } else {
                    self.run_elevation_gain_ft
                }
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steep_descent_description_format() {
        let section = TechnicalSection::steep_descent(12.34, 0.46, -9.87);
        assert_eq!(section.description, "Steep descent at mile 12.3 (0.5mi, -9.9% grade)");
        assert!(section.is_descent());
        assert!(!section.has_technical_keyword());
    }

    #[test]
    fn test_from_description_reads_numbers_once() {
        let section = TechnicalSection::from_description("Narrow descent at mile 45 (-12% grade)");
        assert_eq!(section.start_mile, Some(45.0));
        assert_eq!(section.grade_percent, Some(-12.0));
        assert!(section.is_descent());
        assert!(section.has_technical_keyword());

        let switchbacks = TechnicalSection::from_description("Technical switchbacks at mile 35");
        assert_eq!(switchbacks.start_mile, Some(35.0));
        assert_eq!(switchbacks.grade_percent, None);
        assert_eq!(switchbacks.kind, TechnicalKind::Other);
    }

    #[test]
    fn test_distance_by_activity() {
        let cycling = CourseProfile::new("Test", ActivityType::Cycling, 26.2, 5000.0);
        assert_eq!(cycling.distance_miles(), 26.2);
        assert_eq!(cycling.elevation_gain_ft(), 5000.0);
        assert_eq!(cycling.run_distance_miles, 0.0);

        let running = CourseProfile::new("Test", ActivityType::Running, 13.1, 2500.0);
        assert_eq!(running.distance_miles(), 13.1);
        assert_eq!(running.bike_distance_miles, 0.0);

        let mut mixed = CourseProfile::new("Test", ActivityType::Mixed, 112.0, 5000.0);
        mixed.run_distance_miles = 26.2;
        mixed.run_elevation_gain_ft = 2000.0;
        assert_eq!(mixed.distance_miles(), 112.0);
        assert_eq!(mixed.elevation_gain_ft(), 5000.0);
    }

    #[test]
    fn test_bounds_from_points() {
        let points = vec![
            GeoPoint::new(40.0, -74.0, Some(10.0), 0.0),
            GeoPoint::new(40.5, -74.2, None, 1.0),
            GeoPoint::new(39.9, -73.9, Some(12.0), 2.0),
        ];
        let bounds = Bounds::from_points(&points).unwrap();
        assert_eq!(bounds.min_lat, 39.9);
        assert_eq!(bounds.max_lat, 40.5);
        assert_eq!(bounds.min_lon, -74.2);
        assert_eq!(bounds.max_lon, -73.9);
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_with_points_sets_endpoints() {
        let points = vec![
            GeoPoint::new(40.0, -74.0, Some(10.0), 0.0),
            GeoPoint::new(40.1, -74.1, Some(12.0), 5.0),
        ];
        let course = CourseProfile::new("Loop", ActivityType::Cycling, 5.0, 2.0).with_points(points);
        assert_eq!(course.start_coord, Some(Coordinate::new(40.0, -74.0)));
        assert_eq!(course.finish_coord, Some(Coordinate::new(40.1, -74.1)));
    }
}
