/// Activity-type detection from track distance and speed.

use serde::{Deserialize, Serialize};

use crate::config::ActivityType;
use crate::course::GeoPoint;

/// Anything longer than this is treated as a ride regardless of speed.
pub const LONG_COURSE_MILES: f64 = 50.0;
const LONG_COURSE_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityEstimate {
    pub activity_type: ActivityType,
    pub confidence: f64,
    pub avg_speed_mph: f64,
}

impl ActivityEstimate {
    pub fn manual(activity_type: ActivityType) -> Self {
        ActivityEstimate {
            activity_type,
            confidence: 1.0,
            avg_speed_mph: 0.0,
        }
    }
}

/// Average speed over the track. Uses timestamps when at least two points
/// carry one, otherwise assumes one sample per second.
pub fn average_speed_mph(points: &[GeoPoint]) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    let distance = last.distance_miles - first.distance_miles;

    let mut timed = points.iter().filter_map(|p| p.time);
    let elapsed_hours = match (timed.next(), timed.last()) {
        (Some(start), Some(end)) if end > start => {
            end.signed_duration_since(start).num_milliseconds() as f64 / 3_600_000.0
        }
        _ => (points.len().saturating_sub(1)) as f64 / 3600.0,
    };

    if elapsed_hours > 0.0 {
        distance / elapsed_hours
    } else {
        0.0
    }
}

pub fn detect_activity(points: &[GeoPoint], speed_threshold_mph: f64) -> ActivityEstimate {
    if points.len() < 2 {
        return ActivityEstimate {
            activity_type: ActivityType::Cycling,
            confidence: 0.5,
            avg_speed_mph: 0.0,
        };
    }

    let avg_speed_mph = average_speed_mph(points);
    let distance = points[points.len() - 1].distance_miles - points[0].distance_miles;

    let margin = if speed_threshold_mph > 0.0 {
        ((avg_speed_mph - speed_threshold_mph).abs() / speed_threshold_mph).min(1.0)
    } else {
        1.0
    };
    let speed_confidence = 0.5 + 0.5 * margin;
    let by_speed = if avg_speed_mph >= speed_threshold_mph {
        ActivityType::Cycling
    } else {
        ActivityType::Running
    };

    let (activity_type, confidence) = if distance > LONG_COURSE_MILES {
        let confidence = if by_speed == ActivityType::Cycling {
            speed_confidence.max(LONG_COURSE_CONFIDENCE)
        } else {
            LONG_COURSE_CONFIDENCE
        };
        (ActivityType::Cycling, confidence)
    } else {
        (by_speed, speed_confidence)
    };

    ActivityEstimate {
        activity_type,
        confidence,
        avg_speed_mph,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn steady(count: usize, miles_per_point: f64) -> Vec<GeoPoint> {
        (0..count)
            .map(|i| GeoPoint::new(40.0 + i as f64 * 0.0001, -74.0, Some(100.0), i as f64 * miles_per_point))
            .collect()
    }

    #[test]
    fn test_high_speed_is_cycling() {
        // one hour at 18 mph sampled at 1 Hz
        let estimate = detect_activity(&steady(3600, 0.005), 8.0);
        assert_eq!(estimate.activity_type, ActivityType::Cycling);
        assert!((estimate.avg_speed_mph - 18.0).abs() < 0.01);
        assert!(estimate.confidence > 0.9);
    }

    #[test]
    fn test_low_speed_is_running() {
        let estimate = detect_activity(&steady(3600, 0.00167), 8.0);
        assert_eq!(estimate.activity_type, ActivityType::Running);
        assert!(estimate.confidence > 0.5 && estimate.confidence < 0.7);
    }

    #[test]
    fn test_long_course_is_cycling() {
        // 100 miles at walking pace, length still wins
        let mut points = steady(1000, 0.1);
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        for (i, p) in points.iter_mut().enumerate() {
            p.time = Some(start + Duration::seconds(i as i64 * 180));
        }
        let estimate = detect_activity(&points, 8.0);
        assert_eq!(estimate.activity_type, ActivityType::Cycling);
        assert!(estimate.confidence >= 0.8);
    }

    #[test]
    fn test_timestamps_drive_speed() {
        let mut points = steady(3, 1.0);
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        points[0].time = Some(start);
        points[2].time = Some(start + Duration::minutes(30));
        assert!((average_speed_mph(&points) - 4.0).abs() < 1e-9);
        assert_eq!(detect_activity(&points, 8.0).activity_type, ActivityType::Running);
    }

    #[test]
    fn test_manual_override() {
        let estimate = ActivityEstimate::manual(ActivityType::Mixed);
        assert_eq!(estimate.confidence, 1.0);
        assert_eq!(estimate.activity_type, ActivityType::Mixed);
    }
}
