//! Delimited output of the list-mode course rows.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use coursecrawl_shared::{COURSE_HEADER, CourseCrawlError, CourseRow, OutputConfig, Result};
use tracing::info;

/// Dated output location, e.g. `./udemy-courses-16-10-2026.csv`.
pub fn output_path(config: &OutputConfig, date: NaiveDate) -> PathBuf {
    Path::new(&config.dir).join(format!(
        "{}-{}.csv",
        config.file_prefix,
        date.format("%d-%m-%Y")
    ))
}

/// Write the header and one line per row to `path`, replacing any existing file.
///
/// Quoting of fields that contain the delimiter is left to the `csv` writer.
/// An empty upstream string and a missing key both become an empty cell;
/// the two are not told apart in the output.
/// Returns the number of data rows written.
pub fn write_courses(path: &Path, delimiter: char, rows: &[CourseRow]) -> Result<usize> {
    let delimiter = u8::try_from(delimiter).map_err(|_| {
        CourseCrawlError::config(format!("delimiter {delimiter:?} is not a single byte"))
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CourseCrawlError::io(parent, e))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| CourseCrawlError::Output(format!("{}: {e}", path.display())))?;

    writer
        .write_record(COURSE_HEADER)
        .map_err(|e| CourseCrawlError::Output(format!("{}: {e}", path.display())))?;

    for row in rows {
        writer
            .write_record(row.to_record())
            .map_err(|e| CourseCrawlError::Output(format!("{}: {e}", path.display())))?;
    }

    writer.flush().map_err(|e| CourseCrawlError::io(path, e))?;

    info!(path = %path.display(), rows = rows.len(), "course listing written");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::map_course;
    use serde_json::json;

    fn tmp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("coursecrawl-{tag}-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn output_path_uses_day_month_year() {
        let config = OutputConfig::default();
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            output_path(&config, date),
            PathBuf::from("./udemy-courses-07-03-2026.csv")
        );
    }

    #[test]
    fn writes_header_and_rows_with_caret() {
        let dir = tmp_dir("writer-caret");
        let path = dir.join("out.csv");
        let rows = vec![
            map_course(&json!({"id": 1, "title": "Intro to Go", "price": "Free"})),
            map_course(&json!({"id": 2, "title": "Advanced Go", "avg_rating": 4.2})),
        ];

        let written = write_courses(&path, '^', &rows).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "id^title^url^price^rating^subscribers^reviews^published_lectures^level^duration^published_at"
        );
        assert_eq!(lines[1], "1^Intro to Go^^Free^^^^^^^");
        assert_eq!(lines[2], "2^Advanced Go^^^4.2^^^^^^");
        assert_eq!(lines.len(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn quotes_fields_containing_the_delimiter() {
        let dir = tmp_dir("writer-pipe");
        let path = dir.join("out.csv");
        let rows = vec![map_course(&json!({"id": 3, "title": "Docker | Kubernetes"}))];

        write_courses(&path, '|', &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let line = content.lines().nth(1).unwrap();
        assert!(line.starts_with("3|\"Docker | Kubernetes\"|"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_string_and_missing_key_write_the_same_cell() {
        let dir = tmp_dir("writer-empty");
        let path = dir.join("out.csv");
        let rows = vec![
            map_course(&json!({"id": 4, "title": "", "price": null})),
            map_course(&json!({"id": 5})),
        ];

        write_courses(&path, '^', &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[1], "4^^^^^^^^^^");
        assert_eq!(lines[2], "5^^^^^^^^^^");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tmp_dir("writer-overwrite");
        let path = dir.join("out.csv");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "stale contents\nmore\nlines\nhere\n").unwrap();

        write_courses(&path, '^', &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("id^title"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
