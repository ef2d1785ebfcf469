/// Segment-level tactics: where to attack, where to hold rhythm, where to recover.

use serde::{Deserialize, Serialize};

use crate::course::CourseProfile;
use crate::difficulty::{crux_segments, CruxSegment};

/// Crux segments considered when planning tactics.
pub const TACTICAL_CRUX_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Attack,
    Rhythm,
    Recovery,
}

impl SegmentKind {
    pub fn strategy(&self) -> &'static str {
        match self {
            SegmentKind::Attack => "High-intensity effort to create separation",
            SegmentKind::Rhythm => "Maintain steady threshold power",
            SegmentKind::Recovery => "Active recovery, hydrate and fuel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalSegment {
    pub kind: SegmentKind,
    pub start_mile: f64,
    pub description: String,
    pub strategy: String,
}

impl TacticalSegment {
    fn new(kind: SegmentKind, start_mile: f64, description: String) -> Self {
        TacticalSegment {
            kind,
            start_mile,
            description,
            strategy: kind.strategy().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalAnalysis {
    pub crux_segments: Vec<CruxSegment>,
    pub segments: Vec<TacticalSegment>,
}

/// Classify the course's climbs. Recovery segments come first, then attacks,
/// then rhythm climbs, each group in course order.
pub fn analyze_segments(course: &CourseProfile) -> TacticalAnalysis {
    let climbs = &course.climbs;
    let mut segments = Vec::new();

    for pair in climbs.windows(2) {
        let (previous, climb) = (&pair[0], &pair[1]);
        if climb.avg_grade < 3.0 && previous.avg_grade > 8.0 {
            segments.push(TacticalSegment::new(
                SegmentKind::Recovery,
                climb.start_mile,
                format!("Recovery opportunity after {}", previous.name),
            ));
        }
    }

    for climb in climbs {
        if climb.length_miles < 1.0 && climb.avg_grade > 8.0 {
            segments.push(TacticalSegment::new(
                SegmentKind::Attack,
                climb.start_mile,
                format!("{} - short, steep climb", climb.name),
            ));
        }
    }

    for climb in climbs {
        if climb.length_miles > 2.0 && climb.avg_grade > 4.0 && climb.avg_grade < 8.0 {
            segments.push(TacticalSegment::new(
                SegmentKind::Rhythm,
                climb.start_mile,
                format!("{} - sustained climb", climb.name),
            ));
        }
    }

    TacticalAnalysis {
        crux_segments: crux_segments(course, TACTICAL_CRUX_COUNT),
        segments,
    }
}
