/// Data-quality certification
///
/// Eight independent checks decide whether a course profile is trustworthy
/// enough to plan a race around. A check that cannot be evaluated at all
/// becomes a critical failure for that check only; the rest still run.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::course::CourseProfile;
use crate::error::CheckError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub max_reasonable_gradient: f64,
    pub impossible_gradient: f64,
    pub max_gain_per_mile: f64,
    pub min_course_distance: f64,
    pub max_course_distance: f64,
    pub min_elevation_ft: f64,
    pub max_elevation_ft: f64,
    pub min_gps_points: usize,
    pub max_jumps_per_mile: f64,
    /// Climb gains may exceed the course gain by at most this factor.
    pub climb_gain_ratio: f64,
    /// Above this gain rate a course with no climbs is suspicious.
    pub expected_climbs_gain_per_mile: f64,
    pub strategy_min_score: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            max_reasonable_gradient: 35.0,
            impossible_gradient: 50.0,
            max_gain_per_mile: 1500.0,
            min_course_distance: 5.0,
            max_course_distance: 200.0,
            min_elevation_ft: -500.0,
            max_elevation_ft: 29000.0,
            min_gps_points: 10,
            max_jumps_per_mile: 0.5,
            climb_gain_ratio: 1.5,
            expected_climbs_gain_per_mile: 100.0,
            strategy_min_score: 75.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub check_name: String,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub suggested_fix: Option<String>,
}

impl ValidationResult {
    fn pass(check_name: &str, message: String) -> Self {
        ValidationResult {
            check_name: check_name.to_string(),
            passed: true,
            severity: Severity::Info,
            message,
            details: None,
            suggested_fix: None,
        }
    }

    fn fail(check_name: &str, severity: Severity, message: String, suggested_fix: &str) -> Self {
        ValidationResult {
            check_name: check_name.to_string(),
            passed: false,
            severity,
            message,
            details: None,
            suggested_fix: Some(suggested_fix.to_string()),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub course_name: String,
    pub overall_score: f64,
    pub total_checks: usize,
    pub passed_checks: usize,
    pub critical_failures: usize,
    pub warnings: usize,
    pub valid_for_strategy: bool,
    pub results: Vec<ValidationResult>,
}

impl DataQualityReport {
    fn from_results(course_name: String, results: Vec<ValidationResult>, strategy_min_score: f64) -> Self {
        let total_checks = results.len();
        let passed_checks = results.iter().filter(|r| r.passed).count();
        let failed_with = |severity: Severity| results.iter().filter(|r| !r.passed && r.severity == severity).count();
        let critical_failures = failed_with(Severity::Critical);
        let warnings = failed_with(Severity::Warning);

        let overall_score = if total_checks > 0 {
            let base = passed_checks as f64 / total_checks as f64 * 100.0;
            (base - 20.0 * critical_failures as f64 - 5.0 * warnings as f64).max(0.0)
        } else {
            0.0
        };

        DataQualityReport {
            course_name,
            overall_score,
            total_checks,
            passed_checks,
            critical_failures,
            warnings,
            valid_for_strategy: critical_failures == 0 && overall_score >= strategy_min_score,
            results,
        }
    }

    pub fn is_valid_for_strategy(&self) -> bool {
        self.valid_for_strategy
    }

    pub fn quality_rating(&self) -> &'static str {
        match self.overall_score {
            s if s >= 95.0 => "Excellent",
            s if s >= 85.0 => "Good",
            s if s >= 75.0 => "Acceptable",
            s if s >= 60.0 => "Poor",
            _ => "Unusable",
        }
    }

    /// Plain-text report listing every result and the fix for each failure.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("📊 DATA QUALITY REPORT: {}", self.course_name),
            "=".repeat(60),
            format!("Overall Score: {:.1}/100 ({})", self.overall_score, self.quality_rating()),
            format!(
                "Validation Status: {} for race strategy",
                if self.valid_for_strategy { "✅ VALID" } else { "❌ INVALID" }
            ),
            String::new(),
            "Results Summary:".to_string(),
            format!("  • Total Checks: {}", self.total_checks),
            format!("  • Passed: {}", self.passed_checks),
            format!("  • Critical Failures: {}", self.critical_failures),
            format!("  • Warnings: {}", self.warnings),
            String::new(),
            "Detailed Results:".to_string(),
        ];

        for result in &self.results {
            let icon = match (result.passed, result.severity) {
                (true, _) => "✅",
                (false, Severity::Critical) => "🚨",
                (false, _) => "⚠️",
            };
            lines.push(format!("  {} {}: {}", icon, result.check_name, result.message));
            if let (false, Some(fix)) = (result.passed, &result.suggested_fix) {
                lines.push(format!("     💡 Fix: {}", fix));
            }
        }

        lines.push(String::new());
        if self.critical_failures > 0 {
            lines.push("🚨 CRITICAL ISSUES DETECTED:".to_string());
            lines.push("This course data has critical quality issues that must be resolved".to_string());
            lines.push("before it can be used for race strategy generation.".to_string());
        } else if self.warnings > 0 {
            lines.push("⚠️  DATA QUALITY WARNINGS:".to_string());
            lines.push("This course data has some quality issues but can still be used".to_string());
            lines.push("for strategy generation with reduced confidence.".to_string());
        } else {
            lines.push("🎉 EXCELLENT DATA QUALITY:".to_string());
            lines.push("This course data passes all validation checks and is ready".to_string());
            lines.push("for high-confidence race strategy generation.".to_string());
        }

        lines.join("\n")
    }
}

type CheckResult = Result<Vec<ValidationResult>, CheckError>;
type Check = fn(&DataValidator, &CourseProfile) -> CheckResult;

#[derive(Debug, Clone, Default)]
pub struct DataValidator {
    config: ValidatorConfig,
}

impl DataValidator {
    const CHECKS: [(&'static str, Check); 8] = [
        ("Basic Course Data", DataValidator::check_basic_fields),
        ("Distance Bounds", DataValidator::check_distance_bounds),
        ("Elevation Data", DataValidator::check_elevation),
        ("Gradient Calculations", DataValidator::check_gradients),
        ("Climb Detection", DataValidator::check_climbs),
        ("GPS Point Quality", DataValidator::check_gps_points),
        ("Course Consistency", DataValidator::check_consistency),
        ("Technical Sections", DataValidator::check_technical_sections),
    ];

    pub fn new(config: ValidatorConfig) -> Self {
        DataValidator { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate(&self, course: &CourseProfile) -> DataQualityReport {
        let mut results = Vec::new();
        for (name, check) in Self::CHECKS.iter() {
            match check(self, course) {
                Ok(check_results) => results.extend(check_results),
                Err(e) => {
                    warn!("{} check could not run on {}: {}", name, course.name, e);
                    results.push(ValidationResult::fail(
                        name,
                        Severity::Critical,
                        format!("Validation check failed with error: {}", e),
                        "Review course data structure and fix data corruption",
                    ));
                }
            }
        }

        let course_name = if course.name.trim().is_empty() {
            "Unknown Course".to_string()
        } else {
            course.name.clone()
        };
        let report = DataQualityReport::from_results(course_name, results, self.config.strategy_min_score);
        info!(
            "Data quality for {}: {:.1}/100 ({}), {} critical, {} warnings",
            report.course_name,
            report.overall_score,
            report.quality_rating(),
            report.critical_failures,
            report.warnings
        );
        report
    }

    fn check_basic_fields(&self, course: &CourseProfile) -> CheckResult {
        const NAME: &str = "Basic Course Data";
        let mut errors = Vec::new();

        if course.name.trim().is_empty() {
            errors.push("Course name is missing or empty".to_string());
        }
        let distance = course.distance_miles();
        if distance.is_nan() || distance <= 0.0 {
            errors.push(format!("Invalid distance: {}", distance));
        }
        let gain = course.elevation_gain_ft();
        if gain.is_nan() || gain < 0.0 {
            errors.push(format!("Negative elevation gain: {}", gain));
        }

        if errors.is_empty() {
            return Ok(vec![ValidationResult::pass(NAME, "All basic course data fields are valid".to_string())]);
        }
        Ok(vec![ValidationResult::fail(
            NAME,
            Severity::Critical,
            format!("Basic course data validation failed: {}", errors.join("; ")),
            "Ensure course has valid name, distance, and elevation data",
        )])
    }

    fn check_distance_bounds(&self, course: &CourseProfile) -> CheckResult {
        const NAME: &str = "Distance Bounds";
        let distance = CheckError::ensure_finite("distance", course.distance_miles())?;
        let c = &self.config;

        let result = if distance < c.min_course_distance {
            ValidationResult::fail(
                NAME,
                Severity::Critical,
                format!(
                    "Course distance {:.1} miles is unreasonably short (min: {:.1})",
                    distance, c.min_course_distance
                ),
                "Check GPS data for missing segments or incorrect units",
            )
        } else if distance > c.max_course_distance {
            ValidationResult::fail(
                NAME,
                Severity::Critical,
                format!(
                    "Course distance {:.1} miles is unreasonably long (max: {:.1})",
                    distance, c.max_course_distance
                ),
                "Check for GPS errors causing inflated distance calculations",
            )
            .with_details(json!({ "actual_distance": distance, "max_allowed": c.max_course_distance }))
        } else {
            ValidationResult::pass(
                NAME,
                format!("Course distance {:.1} miles is within reasonable bounds", distance),
            )
        };
        Ok(vec![result])
    }

    fn check_elevation(&self, course: &CourseProfile) -> CheckResult {
        let c = &self.config;

        if course.points.is_empty() {
            return Ok(vec![ValidationResult::fail(
                "Elevation Profile",
                Severity::Critical,
                "No elevation profile data available".to_string(),
                "Ensure GPX file contains elevation data for all track points",
            )]);
        }

        let elevations: Vec<f64> = course.points.iter().filter_map(|p| p.elevation_ft).collect();
        if elevations.is_empty() {
            return Ok(vec![ValidationResult::fail(
                "Elevation Values",
                Severity::Critical,
                "No valid elevation values found in elevation profile".to_string(),
                "Check GPX file for elevation data corruption",
            )]);
        }

        let mut results = Vec::new();
        let min_elevation = elevations.iter().copied().fold(f64::INFINITY, f64::min);
        let max_elevation = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let invalid = elevations
            .iter()
            .filter(|e| !(c.min_elevation_ft..=c.max_elevation_ft).contains(*e))
            .count();

        if invalid > 0 {
            results.push(
                ValidationResult::fail(
                    "Elevation Bounds",
                    Severity::Warning,
                    format!("Found {} elevation values outside reasonable bounds", invalid),
                    "Review GPS data for elevation sensor errors",
                )
                .with_details(json!({
                    "min_elevation": min_elevation,
                    "max_elevation": max_elevation,
                    "invalid_count": invalid,
                    "bounds": format!("{}-{}ft", c.min_elevation_ft, c.max_elevation_ft),
                })),
            );
        } else {
            results.push(ValidationResult::pass(
                "Elevation Bounds",
                format!(
                    "All elevation values within reasonable bounds ({:.0}-{:.0}ft)",
                    min_elevation, max_elevation
                ),
            ));
        }

        let distance = CheckError::ensure_finite("distance", course.distance_miles())?;
        let gain = CheckError::ensure_finite("elevation gain", course.elevation_gain_ft())?;
        let gain_per_mile = if distance > 0.0 { gain / distance } else { 0.0 };
        if gain_per_mile > c.max_gain_per_mile {
            results.push(
                ValidationResult::fail(
                    "Elevation Gain Rate",
                    Severity::Warning,
                    format!(
                        "Elevation gain rate {:.0} ft/mile exceeds maximum reasonable rate",
                        gain_per_mile
                    ),
                    "Verify elevation data accuracy or check for GPS errors",
                )
                .with_details(json!({
                    "gain_per_mile": gain_per_mile,
                    "max_reasonable": c.max_gain_per_mile,
                    "total_gain": gain,
                    "distance": distance,
                })),
            );
        } else {
            results.push(ValidationResult::pass(
                "Elevation Gain Rate",
                format!("Elevation gain rate {:.0} ft/mile is reasonable", gain_per_mile),
            ));
        }

        Ok(results)
    }

    fn check_gradients(&self, course: &CourseProfile) -> CheckResult {
        let c = &self.config;
        if course.climbs.is_empty() {
            return Ok(vec![ValidationResult::pass(
                "Gradient Calculations",
                "No climbs detected, gradient validation skipped".to_string(),
            )]);
        }

        let mut impossible = Vec::new();
        let mut extreme = Vec::new();
        for climb in &course.climbs {
            let max_grade = CheckError::ensure_finite("climb max grade", climb.max_grade)?;
            if max_grade > c.impossible_gradient {
                impossible.push((climb.name.clone(), max_grade));
            } else if max_grade > c.max_reasonable_gradient {
                extreme.push((climb.name.clone(), max_grade));
            }
        }

        let mut results = Vec::new();
        if !impossible.is_empty() {
            results.push(
                ValidationResult::fail(
                    "Impossible Gradients",
                    Severity::Critical,
                    format!(
                        "Found {} climbs with impossible gradients (>{:.0}%)",
                        impossible.len(),
                        c.impossible_gradient
                    ),
                    "Check elevation data for GPS errors or calculation bugs",
                )
                .with_details(json!({ "impossible_gradients": impossible, "max_reasonable": c.max_reasonable_gradient })),
            );
        }
        if !extreme.is_empty() {
            results.push(
                ValidationResult::fail(
                    "Extreme Gradients",
                    Severity::Warning,
                    format!(
                        "Found {} climbs with extreme gradients (>{:.1}%)",
                        extreme.len(),
                        c.max_reasonable_gradient
                    ),
                    "Verify if these extreme gradients are accurate for the course",
                )
                .with_details(json!({ "extreme_gradients": extreme, "max_reasonable": c.max_reasonable_gradient })),
            );
        }
        if results.is_empty() {
            let max_gradient = course.climbs.iter().map(|cl| cl.max_grade).fold(f64::NEG_INFINITY, f64::max);
            results.push(ValidationResult::pass(
                "Gradient Calculations",
                format!("All gradients are reasonable (max: {:.1}%)", max_gradient),
            ));
        }
        Ok(results)
    }

    fn check_climbs(&self, course: &CourseProfile) -> CheckResult {
        const NAME: &str = "Climb Detection";

        if course.climbs.is_empty() {
            let distance = course.distance_miles();
            let gain_per_mile = if distance > 0.0 { course.elevation_gain_ft() / distance } else { 0.0 };
            let result = if gain_per_mile > self.config.expected_climbs_gain_per_mile {
                ValidationResult::fail(
                    NAME,
                    Severity::Warning,
                    format!("No climbs detected despite {:.0} ft/mile elevation gain", gain_per_mile),
                    "Review climb detection parameters or elevation data quality",
                )
                .with_details(json!({ "elevation_gain_per_mile": gain_per_mile }))
            } else {
                ValidationResult::pass(
                    NAME,
                    "No climbs detected, which is reasonable for this elevation profile".to_string(),
                )
            };
            return Ok(vec![result]);
        }

        let mut problems = Vec::new();
        for climb in &course.climbs {
            if climb.length_miles <= 0.0 {
                problems.push(format!("{}: zero/negative length", climb.name));
            }
            if climb.elevation_gain_ft <= 0.0 {
                problems.push(format!("{}: zero/negative elevation gain", climb.name));
            }
            if climb.avg_grade <= 0.0 {
                problems.push(format!("{}: zero/negative average grade", climb.name));
            }
        }

        if problems.is_empty() {
            return Ok(vec![ValidationResult::pass(
                NAME,
                format!(
                    "Detected {} valid climbs with reasonable characteristics",
                    course.climbs.len()
                ),
            )]);
        }
        let shown: Vec<&str> = problems.iter().take(3).map(String::as_str).collect();
        Ok(vec![ValidationResult::fail(
            NAME,
            Severity::Critical,
            format!("Detected invalid climb characteristics: {}", shown.join("; ")),
            "Review climb detection algorithm and elevation data",
        )
        .with_details(json!({ "invalid_climbs": problems.len() }))])
    }

    fn check_gps_points(&self, course: &CourseProfile) -> CheckResult {
        let c = &self.config;

        if course.points.is_empty() {
            return Ok(vec![ValidationResult::fail(
                "GPS Point Quality",
                Severity::Critical,
                "No GPS elevation profile available for quality assessment".to_string(),
                "Ensure GPX file contains track points with coordinates",
            )]);
        }

        let point_count = course.points.len();
        if point_count < c.min_gps_points {
            return Ok(vec![ValidationResult::fail(
                "GPS Point Count",
                Severity::Critical,
                format!(
                    "Insufficient GPS points: {} (minimum: {})",
                    point_count, c.min_gps_points
                ),
                "Ensure GPX file contains adequate track point density",
            )]);
        }

        let mut results = Vec::new();
        let jumps = course.metadata.as_ref().map(|m| m.large_distance_jumps()).unwrap_or(0);
        if jumps > 0 {
            let distance = CheckError::ensure_finite("distance", course.distance_miles())?;
            if distance <= 0.0 {
                return Err(CheckError::Inconsistent(format!(
                    "{} distance jumps recorded on a zero-length course",
                    jumps
                )));
            }
            let per_mile = jumps as f64 / distance;
            if per_mile > c.max_jumps_per_mile {
                results.push(
                    ValidationResult::fail(
                        "GPS Point Continuity",
                        Severity::Warning,
                        format!(
                            "High number of large distance jumps: {} ({:.1} per mile)",
                            jumps, per_mile
                        ),
                        "Review GPS track for signal loss or tracking errors",
                    )
                    .with_details(json!({ "jump_count": jumps, "jumps_per_mile": per_mile })),
                );
            } else {
                results.push(ValidationResult::pass(
                    "GPS Point Continuity",
                    format!("Acceptable number of distance jumps: {}", jumps),
                ));
            }
        }

        results.push(ValidationResult::pass(
            "GPS Point Count",
            format!("Adequate GPS point density: {} points", point_count),
        ));
        Ok(results)
    }

    fn check_consistency(&self, course: &CourseProfile) -> CheckResult {
        let mut results = Vec::new();

        if !course.climbs.is_empty() {
            let climb_total: f64 = course.climbs.iter().map(|cl| cl.elevation_gain_ft).sum();
            let course_total = course.elevation_gain_ft();
            if climb_total > course_total * self.config.climb_gain_ratio {
                let ratio = if course_total > 0.0 {
                    Some(climb_total / course_total)
                } else {
                    None
                };
                results.push(
                    ValidationResult::fail(
                        "Elevation Consistency",
                        Severity::Warning,
                        format!(
                            "Climb elevation gains ({:.0}ft) significantly exceed total course gain ({:.0}ft)",
                            climb_total, course_total
                        ),
                        "Review climb detection algorithm or elevation calculations",
                    )
                    .with_details(json!({ "climb_total": climb_total, "course_total": course_total, "ratio": ratio })),
                );
            } else {
                results.push(ValidationResult::pass(
                    "Elevation Consistency",
                    "Climb elevation gains are consistent with total course elevation".to_string(),
                ));
            }
        }

        if let (Some(start), Some(finish)) = (course.start_coord, course.finish_coord) {
            let result = if !start.is_valid() {
                ValidationResult::fail(
                    "Coordinate Bounds",
                    Severity::Critical,
                    format!("Invalid start coordinates: {}, {}", start.latitude, start.longitude),
                    "Check GPS data for coordinate corruption",
                )
            } else if !finish.is_valid() {
                ValidationResult::fail(
                    "Coordinate Bounds",
                    Severity::Critical,
                    format!("Invalid finish coordinates: {}, {}", finish.latitude, finish.longitude),
                    "Check GPS data for coordinate corruption",
                )
            } else {
                ValidationResult::pass(
                    "Coordinate Bounds",
                    "Start and finish coordinates are within valid ranges".to_string(),
                )
            };
            results.push(result);
        }

        Ok(results)
    }

    /// Always passes; descent detection is trusted as-is for now.
    fn check_technical_sections(&self, course: &CourseProfile) -> CheckResult {
        Ok(vec![ValidationResult::pass(
            "Technical Sections",
            format!("{} technical sections recorded", course.technical_sections.len()),
        )
        .with_details(json!({ "feature_status": "future_enhancement" }))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActivityType;
    use crate::coordinate_validator::QualityReport;
    use crate::course::{ClimbSegment, GeoPoint, GpsMetadata};

    fn points(count: usize, step_miles: f64) -> Vec<GeoPoint> {
        (0..count)
            .map(|i| GeoPoint::new(40.0 + i as f64 * 0.01, -105.0, Some(5000.0 + i as f64 * 10.0), i as f64 * step_miles))
            .collect()
    }

    fn good_course() -> CourseProfile {
        CourseProfile::new("Good Course", ActivityType::Cycling, 50.0, 2500.0)
            .with_climbs(vec![
                ClimbSegment::new("Climb A", 10.0, 2.0, 5.0, 9.0, 600.0),
                ClimbSegment::new("Climb B", 30.0, 1.5, 6.0, 11.0, 500.0),
            ])
            .with_points(points(100, 0.5))
    }

    #[test]
    fn test_good_course_is_valid() {
        let report = DataValidator::default().validate(&good_course());
        assert_eq!(report.critical_failures, 0);
        assert_eq!(report.warnings, 0);
        assert_eq!(report.passed_checks, report.total_checks);
        assert_eq!(report.overall_score, 100.0);
        assert!(report.is_valid_for_strategy());
        assert_eq!(report.quality_rating(), "Excellent");
    }

    #[test]
    fn test_empty_course_is_invalid() {
        let course = CourseProfile::new("", ActivityType::Cycling, 0.0, 0.0);
        let report = DataValidator::default().validate(&course);
        assert_eq!(report.course_name, "Unknown Course");
        assert!(report.critical_failures >= 3);
        assert!(!report.is_valid_for_strategy());
        assert_eq!(report.quality_rating(), "Unusable");
    }

    #[test]
    fn test_gradient_severity() {
        let course = good_course().with_climbs(vec![
            ClimbSegment::new("Wall", 10.0, 0.5, 20.0, 40.0, 500.0),
            ClimbSegment::new("Cliff", 30.0, 0.5, 30.0, 60.0, 800.0),
        ]);
        let report = DataValidator::default().validate(&course);
        let impossible = report.results.iter().find(|r| r.check_name == "Impossible Gradients").unwrap();
        assert_eq!(impossible.severity, Severity::Critical);
        let extreme = report.results.iter().find(|r| r.check_name == "Extreme Gradients").unwrap();
        assert_eq!(extreme.severity, Severity::Warning);
        assert!(!report.is_valid_for_strategy());
    }

    #[test]
    fn test_non_finite_distance_becomes_synthetic_failure() {
        let mut course = good_course();
        course.bike_distance_miles = f64::NAN;
        let report = DataValidator::default().validate(&course);
        let failure = report
            .results
            .iter()
            .find(|r| r.check_name == "Distance Bounds")
            .unwrap();
        assert!(!failure.passed);
        assert_eq!(failure.severity, Severity::Critical);
        assert!(failure.message.starts_with("Validation check failed with error"));
        // the remaining checks still ran
        assert!(report.results.iter().any(|r| r.check_name == "Technical Sections"));
    }

    #[test]
    fn test_jump_rate_warning() {
        let quality = QualityReport {
            large_distance_jumps: 40,
            ..QualityReport::default()
        };
        let metadata = GpsMetadata {
            source: None,
            total_points: 100,
            missing_elevation_points: 0,
            smoothed: true,
            bounds: None,
            quality,
        };
        let course = good_course().with_metadata(metadata);
        let report = DataValidator::default().validate(&course);
        let continuity = report
            .results
            .iter()
            .find(|r| r.check_name == "GPS Point Continuity")
            .unwrap();
        assert!(!continuity.passed);
        assert_eq!(continuity.message, "High number of large distance jumps: 40 (0.8 per mile)");
    }

    #[test]
    fn test_climb_gain_inconsistency() {
        let mut course = good_course();
        course.bike_elevation_gain_ft = 500.0;
        let report = DataValidator::default().validate(&course);
        let consistency = report
            .results
            .iter()
            .find(|r| r.check_name == "Elevation Consistency")
            .unwrap();
        assert!(!consistency.passed);
        assert_eq!(consistency.severity, Severity::Warning);
    }

    #[test]
    fn test_score_formula() {
        let mut course = good_course();
        course.bike_elevation_gain_ft = 500.0;
        let report = DataValidator::default().validate(&course);
        // one warning out of the results
        let expected = (report.total_checks - 1) as f64 / report.total_checks as f64 * 100.0 - 5.0;
        assert!((report.overall_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_summary_lists_fixes() {
        let course = CourseProfile::new("Short", ActivityType::Cycling, 2.0, 100.0);
        let report = DataValidator::default().validate(&course);
        let summary = report.summary();
        assert!(summary.starts_with("📊 DATA QUALITY REPORT: Short"));
        assert!(summary.contains("❌ INVALID"));
        assert!(summary.contains("💡 Fix: Check GPS data for missing segments or incorrect units"));
        assert!(summary.contains("CRITICAL ISSUES DETECTED"));
    }
}
