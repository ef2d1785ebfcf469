pub mod activity;
pub mod batch;
pub mod climb_detector;
pub mod comparison;
pub mod config;
pub mod coordinate_validator;
pub mod course;
pub mod data_validator;
pub mod difficulty;
pub mod elevation_smoother;
pub mod error;
pub mod gps_parser;
pub mod tactics;
pub mod technical_detector;
pub mod track_ingestor;

pub use config::{ActivityConfig, ActivityType, ParserConfig};
pub use coordinate_validator::QualityReport;
pub use course::{ClimbSegment, Coordinate, CourseProfile, GeoPoint, GpsMetadata, TechnicalKind, TechnicalSection};
pub use data_validator::{DataQualityReport, DataValidator, Severity, ValidationResult, ValidatorConfig};
pub use difficulty::{CruxSegment, DifficultyCalculator, DifficultyConfig, DifficultyMetrics, GradientStats};
pub use error::{CheckError, CourseError, Result};
pub use gps_parser::GpsParser;
