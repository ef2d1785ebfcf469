/// Steep-descent detection.

use log::debug;

use crate::config::ParserConfig;
use crate::course::{GeoPoint, TechnicalSection};

/// Index one past the last point that keeps the descent going.
fn extend_descent(points: &[GeoPoint], start: usize, config: &ParserConfig) -> usize {
    let mut j = start + 1;
    while j < points.len() {
        match points[j].grade_percent {
            Some(g) if g <= config.descent_continuation_threshold => j += 1,
            _ => break,
        }
    }
    j
}

/// Find descents that open at `descent_threshold` and stay below the
/// continuation threshold for at least `min_descent_length` miles.
///
/// Once a section is accepted the scan resumes after its last point, so
/// sections never overlap.
pub fn detect_technical_sections(points: &[GeoPoint], config: &ParserConfig) -> Vec<TechnicalSection> {
    let mut sections = Vec::new();
    let mut i = 0;

    while i < points.len() {
        let grade = match points[i].grade_percent {
            Some(g) if g <= config.descent_threshold => g,
            _ => {
                i += 1;
                continue;
            }
        };

        let start_mile = points[i].distance_miles;
        let j = extend_descent(points, i, config);
        let end_mile = if j > i + 1 { points[j - 1].distance_miles } else { start_mile };
        let length = end_mile - start_mile;

        if length >= config.min_descent_length {
            let section = TechnicalSection::steep_descent(start_mile, length, grade);
            debug!("Detected technical section: {}", section);
            sections.push(section);
            // Resume past the section: a long descent is one hazard, not one
            // per qualifying start point, so the count fed to the
            // technical-descent insight stays honest.
            i = j;
        } else {
            i += 1;
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::TechnicalKind;

    fn graded(grades: &[Option<f64>], step: f64) -> Vec<GeoPoint> {
        grades
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let mut p = GeoPoint::new(40.0, -105.0, Some(5000.0), i as f64 * step);
                p.grade_percent = *g;
                p
            })
            .collect()
    }

    #[test]
    fn test_detects_long_descent() {
        let grades = vec![None, Some(1.0), Some(-10.0), Some(-6.0), Some(-4.0), Some(-5.0), Some(-1.0), Some(2.0)];
        let points = graded(&grades, 0.1);
        let sections = detect_technical_sections(&points, &ParserConfig::default());
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.kind, TechnicalKind::SteepDescent);
        assert_eq!(section.grade_percent, Some(-10.0));
        assert!((section.length_miles.unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(section.description, "Steep descent at mile 0.2 (0.3mi, -10.0% grade)");
    }

    #[test]
    fn test_short_descent_rejected() {
        let grades = vec![None, Some(-12.0), Some(-4.0), Some(1.0)];
        let points = graded(&grades, 0.05);
        assert!(detect_technical_sections(&points, &ParserConfig::default()).is_empty());
    }

    #[test]
    fn test_single_point_descent_has_zero_length() {
        let grades = vec![None, Some(-15.0), Some(0.0)];
        let points = graded(&grades, 1.0);
        assert!(detect_technical_sections(&points, &ParserConfig::default()).is_empty());
    }

    #[test]
    fn test_sections_do_not_overlap() {
        let grades = vec![None, Some(-9.0), Some(-9.0), Some(-9.0), Some(-9.0), Some(0.0), Some(-9.0), Some(-9.0), Some(-9.0), Some(-9.0)];
        let points = graded(&grades, 0.1);
        let sections = detect_technical_sections(&points, &ParserConfig::default());
        assert_eq!(sections.len(), 2);
        assert!(sections[1].start_mile.unwrap() > sections[0].start_mile.unwrap() + sections[0].length_miles.unwrap());
    }
}
