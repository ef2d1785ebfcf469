/// Batch analysis of a GPX library
///
/// Each course is analyzed independently, so files are spread over all
/// cores with rayon. Results come back in sorted path order regardless of
/// which thread finished first.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use csv::Writer;
use log::{info, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ParserConfig;
use crate::course::CourseProfile;
use crate::data_validator::{DataQualityReport, DataValidator};
use crate::difficulty::{DifficultyCalculator, DifficultyMetrics};
use crate::error::Result;
use crate::gps_parser::GpsParser;

#[derive(Debug, Clone)]
pub struct CourseAnalysis {
    pub course: CourseProfile,
    pub difficulty: DifficultyMetrics,
    pub data_quality: DataQualityReport,
}

#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    /// Error text for files that could not be parsed.
    pub outcome: std::result::Result<CourseAnalysis, String>,
}

/// Every `.gpx` file under `dir`, sorted.
pub fn find_gpx_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_gpx = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("gpx"))
            .unwrap_or(false);
        if is_gpx {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

pub fn analyze_file(
    path: &Path,
    parser: &GpsParser,
    calculator: &DifficultyCalculator,
    validator: &DataValidator,
) -> Result<CourseAnalysis> {
    let course = parser.parse_gpx_file(path)?;
    let difficulty = calculator.calculate(&course);
    let data_quality = validator.validate(&course);
    Ok(CourseAnalysis {
        course,
        difficulty,
        data_quality,
    })
}

/// Parse, rate and certify every GPX file under `dir` in parallel.
///
/// A file that fails to parse is reported in its entry; it never stops the batch.
pub fn analyze_directory(dir: &Path, config: &ParserConfig) -> Result<Vec<BatchEntry>> {
    let files = find_gpx_files(dir)?;
    info!(
        "Analyzing {} GPX files on {} cores",
        files.len(),
        num_cpus::get()
    );

    let parser = GpsParser::new(config.clone());
    let calculator = DifficultyCalculator::default();
    let validator = DataValidator::default();
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let entries: Vec<BatchEntry> = files
        .par_iter()
        .map(|path| {
            let outcome = analyze_file(path, &parser, &calculator, &validator).map_err(|e| {
                warn!("Failed to analyze {}: {}", path.display(), e);
                e.to_string()
            });
            let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
            info!("Progress: {}/{} ({})", count, total, path.display());
            BatchEntry {
                path: path.clone(),
                outcome,
            }
        })
        .collect();

    let failed = entries.iter().filter(|e| e.outcome.is_err()).count();
    info!("Batch complete: {} analyzed, {} failed", total - failed, failed);
    Ok(entries)
}

pub fn write_summary_csv(entries: &[BatchEntry], output_path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(output_path)?;

    wtr.write_record([
        "file",
        "name",
        "activity",
        "distance_miles",
        "elevation_gain_ft",
        "climbs",
        "technical_sections",
        "difficulty_rating",
        "gps_quality_score",
        "data_quality_score",
        "valid_for_strategy",
        "error",
    ])?;

    for entry in entries {
        let file = entry
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let record = match &entry.outcome {
            Ok(analysis) => {
                let course = &analysis.course;
                let gps_quality = course
                    .metadata
                    .as_ref()
                    .map(|m| format!("{:.1}", m.data_quality_score()))
                    .unwrap_or_default();
                [
                    file,
                    course.name.clone(),
                    course.activity_type.to_string(),
                    format!("{:.2}", course.distance_miles()),
                    format!("{:.0}", course.elevation_gain_ft()),
                    course.climbs.len().to_string(),
                    course.technical_sections.len().to_string(),
                    format!("{:.1}", analysis.difficulty.overall_rating),
                    gps_quality,
                    format!("{:.1}", analysis.data_quality.overall_score),
                    analysis.data_quality.is_valid_for_strategy().to_string(),
                    String::new(),
                ]
            }
            Err(error) => {
                let mut row: [String; 12] = Default::default();
                row[0] = file;
                row[11] = error.clone();
                row
            }
        };
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn climb_gpx(name: &str) -> String {
        let mut gpx = format!(
            "<?xml version=\"1.0\"?>\n<gpx version=\"1.1\" creator=\"test\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n<trk><name>{}</name><trkseg>\n",
            name
        );
        for i in 0..60 {
            let lat = 40.0 + i as f64 * 0.001;
            let ele = 1000.0 + if i < 40 { i as f64 * 8.0 } else { 320.0 };
            gpx.push_str(&format!("<trkpt lat=\"{:.4}\" lon=\"-105.0\"><ele>{:.1}</ele></trkpt>\n", lat, ele));
        }
        gpx.push_str("</trkseg></trk>\n</gpx>\n");
        gpx
    }

    #[test]
    fn test_batch_collects_failures_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_hill.gpx"), climb_gpx("Hill")).unwrap();
        fs::write(dir.path().join("a_broken.GPX"), "<gpx><trk>").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a track").unwrap();

        let entries = analyze_directory(dir.path(), &ParserConfig::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].path.ends_with("a_broken.GPX"));
        assert!(entries[0].outcome.is_err());

        let analysis = entries[1].outcome.as_ref().unwrap();
        assert_eq!(analysis.course.name, "Hill");
        assert!(!analysis.course.climbs.is_empty());
        assert!((1.0..=10.0).contains(&analysis.difficulty.overall_rating));
    }

    #[test]
    fn test_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hill.gpx"), climb_gpx("Hill")).unwrap();
        fs::write(dir.path().join("broken.gpx"), "<gpx>").unwrap();
        let entries = analyze_directory(dir.path(), &ParserConfig::default()).unwrap();

        let csv_path = dir.path().join("summary.csv");
        write_summary_csv(&entries, &csv_path).unwrap();

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 12);
        assert_eq!(&headers[0], "file");
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "broken.gpx");
        assert!(!rows[0][11].is_empty());
        assert_eq!(&rows[1][1], "Hill");
        assert_eq!(&rows[1][11], "");
    }
}
