/// Elevation smoothing and per-point gradient.
///
/// Only the elevation series is filtered; distances and coordinates pass
/// through untouched.

use log::debug;

use crate::course::GeoPoint;

pub const FEET_PER_MILE: f64 = 5280.0;

/// Centered moving average with truncated edges.
///
/// Missing samples are ignored inside each window; a window with no samples
/// stays `None`. Series shorter than the window are returned unchanged.
pub fn moving_average(values: &[Option<f64>], window_size: usize) -> Vec<Option<f64>> {
    if window_size <= 1 || values.len() < window_size {
        return values.to_vec();
    }

    let half = window_size / 2;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(values.len());
            let (sum, count) = values[start..end]
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            if count > 0 {
                Some(sum / count as f64)
            } else {
                None
            }
        })
        .collect()
}

/// Grade (%) of each point relative to its predecessor, computed on the
/// smoothed elevation.
pub fn compute_grades(points: &[GeoPoint], window_size: usize) -> Vec<Option<f64>> {
    let elevations: Vec<Option<f64>> = points.iter().map(|p| p.elevation_ft).collect();
    let smoothed = moving_average(&elevations, window_size);

    let mut grades = vec![None; points.len()];
    for i in 1..points.len() {
        let distance_diff = points[i].distance_miles - points[i - 1].distance_miles;
        if distance_diff <= 0.0 {
            continue;
        }
        if let (Some(prev), Some(curr)) = (smoothed[i - 1], smoothed[i]) {
            grades[i] = Some((curr - prev) / (distance_diff * FEET_PER_MILE) * 100.0);
        }
    }
    grades
}

/// Return the points with `grade_percent` filled in.
pub fn with_grades(mut points: Vec<GeoPoint>, window_size: usize) -> Vec<GeoPoint> {
    let grades = compute_grades(&points, window_size);
    for (point, grade) in points.iter_mut().zip(grades) {
        point.grade_percent = grade;
    }
    debug!(
        "Computed grades for {} points (window {})",
        points.len(),
        window_size
    );
    points
}
