use crate::domain::model::{ReportFormat, SortReport};
use crate::utils::error::{Result, SorterError};

pub const REPORT_BASENAME: &str = "sort_report";

pub fn report_filename(format: ReportFormat) -> String {
    format!("{}.{}", REPORT_BASENAME, format.extension())
}

pub fn render(report: &SortReport, format: ReportFormat) -> Result<Vec<u8>> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_vec_pretty(report)?),
        ReportFormat::Csv => render_delimited(report, b','),
        ReportFormat::Tsv => render_delimited(report, b'\t'),
    }
}

fn render_delimited(report: &SortReport, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(["file", "subject_code", "subject_name", "destination"])?;
    for entry in &report.entries {
        writer.write_record([
            entry.file.as_str(),
            entry.subject_code.as_str(),
            entry.subject_name.as_str(),
            entry.destination.as_deref().unwrap_or(""),
        ])?;
    }

    writer.into_inner().map_err(|e| SorterError::ProcessingError {
        message: format!("Failed to flush report: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{SortEntry, SortMode};

    fn report() -> SortReport {
        SortReport::new(
            SortMode::Copy,
            vec![SortEntry {
                file: "quantum_notes.pdf".to_string(),
                subject_code: "PH101".to_string(),
                subject_name: "Engineering Physics, Part I".to_string(),
                destination: Some("PH101/quantum_notes.pdf".to_string()),
            }],
        )
    }

    #[test]
    fn test_render_csv_quotes_commas() {
        let csv = String::from_utf8(render(&report(), ReportFormat::Csv).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("file,subject_code,subject_name,destination"));
        assert_eq!(
            lines.next(),
            Some(r#"quantum_notes.pdf,PH101,"Engineering Physics, Part I",PH101/quantum_notes.pdf"#)
        );
    }

    #[test]
    fn test_render_tsv() {
        let tsv = String::from_utf8(render(&report(), ReportFormat::Tsv).unwrap()).unwrap();
        assert!(tsv.starts_with("file\tsubject_code\tsubject_name\tdestination"));
        assert!(tsv.contains("PH101\tEngineering Physics, Part I"));
    }

    #[test]
    fn test_render_json() {
        let json = render(&report(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["total_files"], 1);
        assert_eq!(value["mode"], "copy");
        assert_eq!(value["subject_counts"]["PH101"], 1);
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename(ReportFormat::Tsv), "sort_report.tsv");
    }
}
