/// Climb detection
///
/// A single left-to-right pass over the graded points driven by an explicit
/// two-state machine. The scan (`step`) and the accept/reject rule
/// (`accept_candidate`) are separate so each can be tested on its own.

use log::debug;

use crate::config::ParserConfig;
use crate::course::{ClimbSegment, GeoPoint};

#[derive(Debug, Clone, PartialEq)]
pub struct ClimbCandidate {
    pub start_index: usize,
    pub start_mile: f64,
    pub max_grade: f64,
    pub grades: Vec<f64>,
}

impl ClimbCandidate {
    fn open(index: usize, mile: f64, grade: f64) -> Self {
        ClimbCandidate {
            start_index: index,
            start_mile: mile,
            max_grade: grade,
            grades: vec![grade],
        }
    }

    /// Mean grade of the climb proper. Trailing recovery samples below
    /// `min_climb_grade` stay in the span but are left out of the mean.
    pub fn avg_grade(&self, min_climb_grade: f64) -> f64 {
        let climbing = self
            .grades
            .iter()
            .rposition(|g| *g >= min_climb_grade)
            .map(|last| &self.grades[..=last])
            .unwrap_or(&self.grades[..]);
        if climbing.is_empty() {
            return 0.0;
        }
        climbing.iter().sum::<f64>() / climbing.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClimbState {
    Idle,
    InClimb(ClimbCandidate),
}

/// A candidate that has stopped climbing, ending at `end_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedClimb {
    pub candidate: ClimbCandidate,
    pub end_index: usize,
}

/// Advance the state machine by one graded point.
pub fn step(state: ClimbState, index: usize, mile: f64, grade: f64, config: &ParserConfig) -> (ClimbState, Option<ClosedClimb>) {
    match state {
        ClimbState::Idle => {
            if grade >= config.min_climb_grade {
                (ClimbState::InClimb(ClimbCandidate::open(index, mile, grade)), None)
            } else {
                (ClimbState::Idle, None)
            }
        }
        ClimbState::InClimb(mut candidate) => {
            if grade >= 0.0 {
                candidate.grades.push(grade);
                candidate.max_grade = candidate.max_grade.max(grade);
                (ClimbState::InClimb(candidate), None)
            } else {
                let closed = ClosedClimb {
                    candidate,
                    end_index: index,
                };
                (ClimbState::Idle, Some(closed))
            }
        }
    }
}

/// Whether a closed candidate is long enough to report. Length is the only
/// boundary; flat recovery inside a climb never disqualifies it.
pub fn accept_candidate(length_miles: f64, config: &ParserConfig) -> bool {
    length_miles >= config.min_climb_distance
}

fn build_segment(closed: ClosedClimb, points: &[GeoPoint], config: &ParserConfig) -> Option<ClimbSegment> {
    let ClosedClimb { candidate, end_index } = closed;
    let end = &points[end_index];
    let length_miles = end.distance_miles - candidate.start_mile;

    if !accept_candidate(length_miles, config) {
        debug!(
            "Discarded climb candidate at mile {:.2} ({:.2} mi)",
            candidate.start_mile, length_miles
        );
        return None;
    }
    let avg_grade = candidate.avg_grade(config.min_climb_grade);

    let span = &points[candidate.start_index..=end_index];
    let start_elevation = span.iter().find_map(|p| p.elevation_ft);
    let end_elevation = span.iter().rev().find_map(|p| p.elevation_ft);
    let elevation_gain_ft = match (start_elevation, end_elevation) {
        (Some(start), Some(end)) => (end - start).max(0.0),
        _ => 0.0,
    };

    let start = &points[candidate.start_index];
    Some(ClimbSegment {
        name: format!("Climb at mile {:.1}", candidate.start_mile),
        start_mile: candidate.start_mile,
        length_miles,
        avg_grade,
        max_grade: candidate.max_grade,
        elevation_gain_ft,
        start_coord: Some(start.coordinate()),
        end_coord: Some(end.coordinate()),
        points: span.to_vec(),
    })
}

pub fn detect_climbs(points: &[GeoPoint], config: &ParserConfig) -> Vec<ClimbSegment> {
    let mut climbs = Vec::new();
    let mut state = ClimbState::Idle;

    for (i, point) in points.iter().enumerate() {
        let Some(grade) = point.grade_percent else {
            continue;
        };
        let (next, closed) = step(state, i, point.distance_miles, grade, config);
        state = next;
        if let Some(closed) = closed {
            climbs.extend(build_segment(closed, points, config));
        }
    }

    // A climb still open at the finish ends on the last point.
    if let ClimbState::InClimb(candidate) = state {
        let closed = ClosedClimb {
            candidate,
            end_index: points.len() - 1,
        };
        climbs.extend(build_segment(closed, points, config));
    }

    for climb in &climbs {
        debug!(
            "Detected {}: {:.2} mi at {:.1}% avg ({:.1}% max)",
            climb.name, climb.length_miles, climb.avg_grade, climb.max_grade
        );
    }
    climbs
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Points spaced `step` miles apart with the given grades; elevation follows the grade.
    fn graded(grades: &[Option<f64>], step: f64) -> Vec<GeoPoint> {
        let mut elevation = 1000.0;
        grades
            .iter()
            .enumerate()
            .map(|(i, grade)| {
                if let Some(g) = grade {
                    elevation += g / 100.0 * step * 5280.0;
                }
                let mut p = GeoPoint::new(40.0, -105.0 + i as f64 * 0.001, Some(elevation), i as f64 * step);
                p.grade_percent = *grade;
                p
            })
            .collect()
    }

    #[test]
    fn test_state_transitions() {
        let config = ParserConfig::default();
        let (state, closed) = step(ClimbState::Idle, 1, 0.1, 2.0, &config);
        assert_eq!(state, ClimbState::Idle);
        assert!(closed.is_none());

        let (state, _) = step(ClimbState::Idle, 1, 0.1, 4.0, &config);
        assert!(matches!(state, ClimbState::InClimb(_)));

        let (state, closed) = step(state, 2, 0.2, 0.0, &config);
        assert!(closed.is_none());
        let ClimbState::InClimb(candidate) = &state else {
            panic!("expected to stay in climb");
        };
        assert_eq!(candidate.grades, vec![4.0, 0.0]);

        let (state, closed) = step(state, 3, 0.3, -1.0, &config);
        assert_eq!(state, ClimbState::Idle);
        assert_eq!(closed.unwrap().end_index, 3);
    }

    #[test]
    fn test_accept_boundary() {
        let config = ParserConfig::default();
        assert!(accept_candidate(0.5, &config));
        assert!(accept_candidate(2.0, &config));
        assert!(!accept_candidate(0.49, &config));
    }

    #[test]
    fn test_detects_single_climb() {
        let mut grades = vec![None, Some(0.0), Some(0.0)];
        grades.extend(std::iter::repeat(Some(6.0)).take(10));
        grades.extend([Some(-2.0), Some(0.0)]);
        let points = graded(&grades, 0.1);

        let climbs = detect_climbs(&points, &ParserConfig::default());
        assert_eq!(climbs.len(), 1);
        let climb = &climbs[0];
        assert_eq!(climb.name, "Climb at mile 0.3");
        assert!((climb.length_miles - 1.0).abs() < 1e-9);
        assert!((climb.avg_grade - 6.0).abs() < 1e-9);
        assert_eq!(climb.max_grade, 6.0);
        assert!(climb.elevation_gain_ft > 0.0);
        assert_eq!(climb.points.len(), 11);
        assert!(climb.start_coord.is_some());
    }

    #[test]
    fn test_short_steep_candidate_discarded() {
        let grades = vec![None, Some(0.0), Some(8.0), Some(8.0), Some(-3.0), Some(0.0)];
        let points = graded(&grades, 0.05);
        assert!(detect_climbs(&points, &ParserConfig::default()).is_empty());
    }

    #[test]
    fn test_climb_open_at_finish_is_emitted() {
        let mut grades = vec![None];
        grades.extend(std::iter::repeat(Some(5.0)).take(8));
        let points = graded(&grades, 0.1);
        let climbs = detect_climbs(&points, &ParserConfig::default());
        assert_eq!(climbs.len(), 1);
        assert!((climbs[0].length_miles - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_missing_grades_do_not_break_climb() {
        let mut grades = vec![None];
        grades.extend(std::iter::repeat(Some(5.0)).take(4));
        grades.push(None);
        grades.extend(std::iter::repeat(Some(5.0)).take(4));
        grades.push(Some(-5.0));
        let points = graded(&grades, 0.1);
        let climbs = detect_climbs(&points, &ParserConfig::default());
        assert_eq!(climbs.len(), 1);
        assert_eq!(climbs[0].avg_grade, 5.0);
    }

    #[test]
    fn test_invariants_hold() {
        let grades: Vec<Option<f64>> = (0..200)
            .map(|i| if i == 0 { None } else { Some(((i as f64) / 7.0).sin() * 9.0) })
            .collect();
        let points = graded(&grades, 0.05);
        let config = ParserConfig::default();
        for climb in detect_climbs(&points, &config) {
            assert!(climb.length_miles >= config.min_climb_distance);
            assert!(climb.max_grade >= climb.avg_grade);
            assert!(climb.elevation_gain_ft >= 0.0);
        }
    }

    #[test]
    fn test_flat_recovery_keeps_climb() {
        let mut grades = vec![None];
        grades.extend(std::iter::repeat(Some(3.5)).take(40));
        grades.extend(std::iter::repeat(Some(0.0)).take(10));
        grades.push(Some(-4.0));
        let points = graded(&grades, 0.05);

        let climbs = detect_climbs(&points, &ParserConfig::default());
        assert_eq!(climbs.len(), 1);
        // the flat tail counts toward length but not the average
        assert!((climbs[0].length_miles - 2.5).abs() < 1e-9);
        assert!((climbs[0].avg_grade - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_avg_grade_ignores_trailing_recovery() {
        let candidate = ClimbCandidate {
            start_index: 0,
            start_mile: 0.0,
            max_grade: 6.0,
            grades: vec![4.0, 1.0, 6.0, 2.0, 0.0],
        };
        assert!((candidate.avg_grade(3.0) - 11.0 / 3.0).abs() < 1e-12);
    }
}
