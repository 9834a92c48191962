//! CSV export of qualified leads.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use leadcollector_shared::{CandidatePost, LeadCollectorError, Result};

/// A ready-to-write CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadExport {
    /// `linkedin_leads_<YYYYMMDD_HHMM>.csv`
    pub file_name: String,
    /// UTF-8 CSV with a header row.
    pub csv: Vec<u8>,
    /// Data rows, excluding the header.
    pub rows: usize,
}

impl LeadExport {
    /// Write the CSV into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| LeadCollectorError::io(dir, e))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.csv).map_err(|e| LeadCollectorError::io(&path, e))?;
        info!(path = %path.display(), rows = self.rows, "wrote lead export");
        Ok(path)
    }
}

/// File name embedding the export time to the minute.
pub fn export_file_name(at: DateTime<Local>) -> String {
    format!("linkedin_leads_{}.csv", at.format("%Y%m%d_%H%M"))
}

/// Encode `leads` as CSV, one row per post, columns in field order.
pub fn build_export(leads: &[CandidatePost], at: DateTime<Local>) -> Result<LeadExport> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for lead in leads {
        writer
            .serialize(lead)
            .map_err(|e| LeadCollectorError::Export(format!("{}: {e}", lead.url)))?;
    }
    let csv = writer
        .into_inner()
        .map_err(|e| LeadCollectorError::Export(e.to_string()))?;

    Ok(LeadExport {
        file_name: export_file_name(at),
        csv,
        rows: leads.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 59).unwrap()
    }

    fn lead(url: &str, score: u8) -> CandidatePost {
        CandidatePost {
            url: url.into(),
            title: "Jane on LinkedIn".into(),
            snippet: "Need a CRM, any ideas?".into(),
            date: Some("2 days ago".into()),
            scraped_text: "Need a \"real\" CRM,\nfast".into(),
            ai_score: score,
            reason: "Asking for vendors".into(),
            key_match: "any ideas?".into(),
        }
    }

    #[test]
    fn file_name_embeds_timestamp() {
        assert_eq!(export_file_name(at()), "linkedin_leads_20260309_1405.csv");
    }

    #[test]
    fn csv_has_header_and_field_columns() {
        let export = build_export(&[lead("https://www.linkedin.com/posts/a", 91)], at()).unwrap();
        let text = String::from_utf8(export.csv).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("url,title,snippet,date,scraped_text,ai_score,reason,key_match")
        );
        assert!(text.contains("https://www.linkedin.com/posts/a,Jane on LinkedIn,"));
        assert!(text.contains(r#""Need a CRM, any ideas?""#));
        assert!(text.contains(r#""Need a ""real"" CRM,"#));
        assert!(text.contains(",91,Asking for vendors,any ideas?"));
        assert_eq!(export.rows, 1);
    }

    #[test]
    fn missing_date_is_empty_cell() {
        let mut post = lead("u", 50);
        post.date = None;
        let export = build_export(&[post], at()).unwrap();
        let text = String::from_utf8(export.csv).unwrap();
        assert!(text.contains("Need a CRM, any ideas?\","));
        assert!(text.contains("any ideas?\",,\"Need"));
    }

    #[test]
    fn rows_follow_input_order() {
        let export = build_export(&[lead("first", 90), lead("second", 60)], at()).unwrap();
        let text = String::from_utf8(export.csv).unwrap();
        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        assert!(first < second);
        assert_eq!(export.rows, 2);
    }

    #[test]
    fn write_to_creates_file() {
        let dir = std::env::temp_dir().join(format!("leadcollector-export-{}", std::process::id()));
        let export = build_export(&[lead("u", 70)], at()).unwrap();
        let path = export.write_to(&dir).unwrap();
        assert_eq!(path.file_name().unwrap(), "linkedin_leads_20260309_1405.csv");
        assert_eq!(std::fs::read(&path).unwrap(), export.csv);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
