/// Side-by-side comparison of two scored courses.

use serde::{Deserialize, Serialize};

use crate::course::CourseProfile;
use crate::difficulty::{format_feet, DifficultyCalculator, DifficultyMetrics};

/// One metric for both courses, in the order they were passed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPair {
    pub first: f64,
    pub second: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    pub overall_rating: MetricPair,
    pub elevation_intensity: MetricPair,
    pub max_gradient: MetricPair,
    pub technical_difficulty: MetricPair,
    pub climb_clustering: MetricPair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseComparison {
    pub first_name: String,
    pub second_name: String,
    /// First course's rating minus the second's.
    pub difficulty_difference: f64,
    pub harder_course: String,
    pub metrics: MetricsTable,
    pub key_differences: Vec<String>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn pair(first: f64, second: f64, decimals: i32) -> MetricPair {
    MetricPair {
        first: round_to(first, decimals),
        second: round_to(second, decimals),
    }
}

impl DifficultyCalculator {
    pub fn compare(&self, first: &CourseProfile, second: &CourseProfile) -> CourseComparison {
        let m1 = self.calculate(first);
        let m2 = self.calculate(second);

        let harder_course = if m1.overall_rating > m2.overall_rating {
            first.name.clone()
        } else {
            second.name.clone()
        };

        CourseComparison {
            first_name: first.name.clone(),
            second_name: second.name.clone(),
            difficulty_difference: m1.overall_rating - m2.overall_rating,
            harder_course,
            metrics: MetricsTable {
                overall_rating: pair(m1.overall_rating, m2.overall_rating, 1),
                elevation_intensity: pair(m1.elevation_intensity_ft_per_mile, m2.elevation_intensity_ft_per_mile, 1),
                max_gradient: pair(m1.max_grade, m2.max_grade, 1),
                technical_difficulty: pair(m1.technical_difficulty, m2.technical_difficulty, 2),
                climb_clustering: pair(m1.climb_clustering, m2.climb_clustering, 2),
            },
            key_differences: key_differences(first, second, &m1, &m2),
        }
    }
}

/// Rule-based list of the differences worth mentioning.
pub fn key_differences(
    first: &CourseProfile,
    second: &CourseProfile,
    m1: &DifficultyMetrics,
    m2: &DifficultyMetrics,
) -> Vec<String> {
    let mut differences = Vec::new();
    let pick = |first_wins: bool| if first_wins { &first.name } else { &second.name };

    let rating_gap = (m1.overall_rating - m2.overall_rating).abs();
    let harder = pick(m1.overall_rating > m2.overall_rating);
    if rating_gap > 2.0 {
        differences.push(format!(
            "{} is significantly more difficult ({:.1} points higher)",
            harder, rating_gap
        ));
    } else if rating_gap > 0.5 {
        differences.push(format!("{} is moderately more difficult", harder));
    }

    let intensity_gap = (m1.elevation_intensity_ft_per_mile - m2.elevation_intensity_ft_per_mile).abs();
    if intensity_gap > 50.0 {
        let hillier = pick(m1.elevation_intensity_ft_per_mile > m2.elevation_intensity_ft_per_mile);
        differences.push(format!(
            "{} has much more climbing ({:.0} ft/mile more)",
            hillier, intensity_gap
        ));
    }

    if (m1.climb_clustering - m2.climb_clustering).abs() > 0.3 {
        let (sustained, rolling) = if m1.climb_clustering > m2.climb_clustering {
            (&first.name, &second.name)
        } else {
            (&second.name, &first.name)
        };
        differences.push(format!("{} has longer sustained climbs", sustained));
        differences.push(format!("{} has more rolling terrain", rolling));
    }

    if (m1.technical_difficulty - m2.technical_difficulty).abs() > 0.2 {
        let technical = pick(m1.technical_difficulty > m2.technical_difficulty);
        differences.push(format!("{} has more technical challenges", technical));
    }

    let altitude_gap = (first.altitude_ft - second.altitude_ft).abs();
    if altitude_gap > 2000.0 {
        let higher = pick(first.altitude_ft > second.altitude_ft);
        differences.push(format!(
            "{} is at significantly higher altitude ({} ft higher)",
            higher,
            format_feet(altitude_gap)
        ));
    }

    differences
}
