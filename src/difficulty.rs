/// Course difficulty rating
///
/// Every score here is a pure function of a finished `CourseProfile`. The
/// calculator keeps no state between courses, so one instance can be shared
/// freely across threads.

use serde::{Deserialize, Serialize};

use crate::course::{ClimbSegment, CourseProfile};

/// Gradient bands (%): easy below the first, extreme at or above the last.
const GRADE_EASY: f64 = 3.0;
const GRADE_MODERATE: f64 = 6.0;
const GRADE_HARD: f64 = 10.0;

/// Elevation intensity bands (ft/mile).
const INTENSITY_FLAT: f64 = 20.0;
const INTENSITY_ROLLING: f64 = 50.0;
const INTENSITY_HILLY: f64 = 100.0;
const INTENSITY_MOUNTAINOUS: f64 = 150.0;

const HIGH_ALTITUDE_FT: f64 = 5000.0;
const LATE_RACE_FRACTION: f64 = 0.7;
const TECHNICAL_KEYWORD_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Crux segments reported by `calculate`.
    pub crux_top_n: usize,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        DifficultyConfig { crux_top_n: 3 }
    }
}

/// Share (%) of gradient samples in each band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientDistribution {
    pub easy: f64,
    pub moderate: f64,
    pub hard: f64,
    pub extreme: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientStats {
    pub avg: f64,
    pub max: f64,
    /// Population standard deviation of the samples.
    pub std_dev: f64,
    pub distribution: GradientDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CruxSegment {
    pub name: String,
    pub start_mile: f64,
    pub length_miles: f64,
    pub avg_grade: f64,
    pub max_grade: f64,
    pub elevation_gain_ft: f64,
    pub difficulty_score: f64,
    pub strategic_importance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMetrics {
    pub overall_rating: f64,
    pub elevation_intensity_ft_per_mile: f64,
    pub avg_grade: f64,
    pub max_grade: f64,
    pub grade_variance: f64,
    pub gradient_distribution: GradientDistribution,
    pub climb_clustering: f64,
    pub technical_difficulty: f64,
    pub crux_segments: Vec<CruxSegment>,
    pub justification: String,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DifficultyCalculator {
    config: DifficultyConfig,
}

impl DifficultyCalculator {
    pub fn new(config: DifficultyConfig) -> Self {
        DifficultyCalculator { config }
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    pub fn calculate(&self, course: &CourseProfile) -> DifficultyMetrics {
        let intensity = elevation_intensity(course);
        let stats = gradient_stats(course);
        let clustering = climb_clustering(course);
        let technical = technical_difficulty(course);
        let crux = crux_segments(course, self.config.crux_top_n);

        let rating = overall_rating(course.distance_miles(), intensity, &stats, clustering, technical, course.altitude_ft);
        let justification = justification(rating, intensity, &stats, clustering, technical, course.altitude_ft);
        let insights = insights(course, intensity, &crux, clustering);

        DifficultyMetrics {
            overall_rating: rating,
            elevation_intensity_ft_per_mile: intensity,
            avg_grade: stats.avg,
            max_grade: stats.max,
            grade_variance: stats.std_dev,
            gradient_distribution: stats.distribution,
            climb_clustering: clustering,
            technical_difficulty: technical,
            crux_segments: crux,
            justification,
            insights,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Format a whole number of feet with thousands separators, e.g. `6,000`.
pub(crate) fn format_feet(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Feet of climbing per mile of course.
pub fn elevation_intensity(course: &CourseProfile) -> f64 {
    let distance = course.distance_miles();
    if distance <= 0.0 {
        return 0.0;
    }
    course.elevation_gain_ft() / distance
}

/// Statistics over every climb's average and maximum grade plus the
/// magnitude of every graded point.
pub fn gradient_stats(course: &CourseProfile) -> GradientStats {
    let mut samples = Vec::new();
    for climb in &course.climbs {
        samples.push(climb.avg_grade);
        if climb.max_grade > 0.0 {
            samples.push(climb.max_grade);
        }
    }
    samples.extend(course.points.iter().filter_map(|p| p.grade_percent).map(f64::abs));

    if samples.is_empty() {
        return GradientStats::default();
    }

    let mut counts = [0usize; 4];
    for grade in samples.iter().map(|g| g.abs()) {
        let band = if grade < GRADE_EASY {
            0
        } else if grade < GRADE_MODERATE {
            1
        } else if grade < GRADE_HARD {
            2
        } else {
            3
        };
        counts[band] += 1;
    }
    let total = samples.len() as f64;
    let share = |count: usize| count as f64 / total * 100.0;

    GradientStats {
        avg: mean(&samples),
        max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        std_dev: population_std_dev(&samples),
        distribution: GradientDistribution {
            easy: share(counts[0]),
            moderate: share(counts[1]),
            hard: share(counts[2]),
            extreme: share(counts[3]),
        },
    }
}

/// 0 for rolling terrain, 1 for a course dominated by long sustained climbs.
pub fn climb_clustering(course: &CourseProfile) -> f64 {
    if course.climbs.len() < 2 {
        return 0.0;
    }

    let mut starts: Vec<f64> = course.climbs.iter().map(|c| c.start_mile).collect();
    starts.sort_by(|a, b| a.total_cmp(b));
    let gaps: Vec<f64> = starts.windows(2).map(|w| w[1] - w[0]).collect();

    let avg_gap = mean(&gaps);
    let normalized_variance = if avg_gap > 0.0 {
        population_std_dev(&gaps) / avg_gap
    } else {
        0.0
    };

    let distance = course.distance_miles();
    let max_length = course
        .climbs
        .iter()
        .map(|c| c.length_miles)
        .fold(0.0, f64::max);
    let length_factor = if distance > 0.0 { max_length / distance } else { 0.0 };

    (normalized_variance * 0.6 + length_factor * 4.0).clamp(0.0, 1.0)
}

pub fn technical_difficulty(course: &CourseProfile) -> f64 {
    let mut factors = Vec::new();

    for climb in &course.climbs {
        if climb.max_grade > 15.0 {
            factors.push((climb.max_grade / 30.0).min(1.0));
        }
        if climb.avg_grade > 10.0 {
            factors.push((climb.avg_grade / 20.0).min(1.0));
        }
    }

    for section in &course.technical_sections {
        if let Some(grade) = section.grade_percent.map(f64::abs) {
            if grade > 8.0 {
                factors.push((grade / 20.0).min(1.0));
            }
        }
        if section.has_technical_keyword() {
            factors.push(TECHNICAL_KEYWORD_WEIGHT);
        }
    }

    mean(&factors)
}

/// Weighted difficulty of one climb in the context of its course, in [0, 1].
pub fn crux_score(climb: &ClimbSegment, course_distance: f64) -> f64 {
    let position = if course_distance > 0.0 {
        climb.start_mile / course_distance
    } else {
        0.0
    };
    let score = (climb.avg_grade / 10.0) * 0.4
        + (climb.max_grade / 20.0) * 0.2
        + (climb.length_miles / 3.0) * 0.2
        + (climb.elevation_gain_ft / 1000.0) * 0.2
        + position * 0.1;
    score.clamp(0.0, 1.0)
}

pub fn strategic_importance(climb: &ClimbSegment, course: &CourseProfile) -> String {
    let mut factors = Vec::new();

    if climb.start_mile > course.distance_miles() * LATE_RACE_FRACTION {
        factors.push("Late-race position increases importance");
    }
    if climb.avg_grade > 10.0 {
        factors.push("Steep gradient creates selection");
    }
    if climb.length_miles > 2.0 {
        factors.push("Sustained effort required");
    }
    let followed_by_descent = course.technical_sections.iter().any(|section| {
        section.is_descent()
            && section
                .start_mile
                .map(|mile| (mile - climb.end_mile()).abs() < 2.0)
                .unwrap_or(false)
    });
    if followed_by_descent {
        factors.push("Followed by technical descent");
    }

    if factors.is_empty() {
        "Key segment".to_string()
    } else {
        factors.join("; ")
    }
}

/// The `top_n` hardest climbs, hardest first. Equal scores keep course order.
pub fn crux_segments(course: &CourseProfile, top_n: usize) -> Vec<CruxSegment> {
    let distance = course.distance_miles();
    let mut candidates: Vec<CruxSegment> = course
        .climbs
        .iter()
        .map(|climb| CruxSegment {
            name: climb.name.clone(),
            start_mile: climb.start_mile,
            length_miles: climb.length_miles,
            avg_grade: climb.avg_grade,
            max_grade: climb.max_grade,
            elevation_gain_ft: climb.elevation_gain_ft,
            difficulty_score: crux_score(climb, distance),
            strategic_importance: strategic_importance(climb, course),
        })
        .collect();

    candidates.sort_by(|a, b| b.difficulty_score.total_cmp(&a.difficulty_score));
    candidates.truncate(top_n);
    candidates
}

fn intensity_points(intensity: f64) -> f64 {
    if intensity < INTENSITY_FLAT {
        0.5
    } else if intensity < INTENSITY_ROLLING {
        1.0
    } else if intensity < INTENSITY_HILLY {
        2.0
    } else if intensity < INTENSITY_MOUNTAINOUS {
        2.5
    } else {
        3.0
    }
}

/// Overall rating on a 1-10 scale, rounded to one decimal.
///
/// A course with no distance earns no terrain points and rates exactly 1.0.
pub fn overall_rating(
    distance_miles: f64,
    intensity: f64,
    stats: &GradientStats,
    clustering: f64,
    technical: f64,
    altitude_ft: f64,
) -> f64 {
    let mut rating = 1.0;

    if distance_miles > 0.0 {
        rating += intensity_points(intensity);
    }
    rating += (stats.avg / 5.0).min(2.0);
    rating += (stats.max / 20.0).min(1.0);
    rating += clustering;
    rating += technical;
    if altitude_ft > HIGH_ALTITUDE_FT {
        rating += ((altitude_ft - HIGH_ALTITUDE_FT) / HIGH_ALTITUDE_FT).min(1.0);
    }

    if !rating.is_finite() {
        return 1.0;
    }
    ((rating * 10.0).round() / 10.0).clamp(1.0, 10.0)
}

pub fn justification(
    rating: f64,
    intensity: f64,
    stats: &GradientStats,
    clustering: f64,
    technical: f64,
    altitude_ft: f64,
) -> String {
    let mut parts = Vec::new();

    parts.push(
        if rating <= 3.0 {
            "This is a relatively easy course"
        } else if rating <= 5.0 {
            "This is a moderately challenging course"
        } else if rating <= 7.0 {
            "This is a challenging course"
        } else {
            "This is an extremely difficult course"
        }
        .to_string(),
    );

    let terrain = if intensity < INTENSITY_FLAT {
        "minimal elevation"
    } else if intensity < INTENSITY_ROLLING {
        "rolling terrain"
    } else if intensity < INTENSITY_HILLY {
        "hilly terrain"
    } else if intensity < INTENSITY_MOUNTAINOUS {
        "mountainous terrain"
    } else {
        "extreme elevation"
    };
    parts.push(format!("with {} ({:.0} ft/mile)", terrain, intensity));

    if stats.max > 15.0 {
        parts.push(format!("including very steep sections up to {:.1}%", stats.max));
    } else if stats.max > 10.0 {
        parts.push(format!("with steep climbs up to {:.1}%", stats.max));
    }

    if clustering > 0.7 {
        parts.push("featuring long, sustained climbs".to_string());
    } else if clustering < 0.3 {
        parts.push("with evenly distributed rolling hills".to_string());
    }

    if technical > 0.5 {
        parts.push("and significant technical challenges".to_string());
    }

    if altitude_ft > HIGH_ALTITUDE_FT {
        parts.push(format!("at high altitude ({} ft)", format_feet(altitude_ft)));
    }

    parts.join(". ") + "."
}

pub fn insights(course: &CourseProfile, intensity: f64, crux: &[CruxSegment], clustering: f64) -> Vec<String> {
    let mut insights = Vec::new();

    if intensity > INTENSITY_HILLY {
        insights.push("Conservative pacing essential - save energy for frequent climbs".to_string());
    } else if intensity > INTENSITY_ROLLING {
        insights.push("Maintain steady effort on rolling sections".to_string());
    }

    if clustering > 0.7 {
        insights.push("Long climbs require sustained power - practice extended threshold efforts".to_string());
    } else if clustering < 0.3 {
        insights.push("Frequent short climbs favor explosive power - train repeated accelerations".to_string());
    }

    if let Some(key) = crux.first() {
        insights.push(format!(
            "Key selection point: {} at mile {:.1} ({:.1}% grade)",
            key.name, key.start_mile, key.avg_grade
        ));

        let late_mile = course.distance_miles() * LATE_RACE_FRACTION;
        if let Some(late) = crux.iter().find(|s| s.start_mile > late_mile) {
            insights.push(format!(
                "Critical late-race climb at mile {:.1} - conserve energy early",
                late.start_mile
            ));
        }
    }

    let descents = course.technical_sections.iter().filter(|s| s.is_descent()).count();
    if descents > 3 {
        insights.push(format!(
            "{} technical descents - practice descending skills for time gains",
            descents
        ));
    }

    if course.altitude_ft > HIGH_ALTITUDE_FT {
        insights.push(format!(
            "High altitude ({} ft) will reduce power output by ~10-15%",
            format_feet(course.altitude_ft)
        ));
        insights.push("Arrive 2-3 days early for altitude acclimatization".to_string());
    }

    if intensity > INTENSITY_HILLY {
        insights.push("High energy demands - increase carbohydrate intake to 90g/hour".to_string());
    }

    insights
}
