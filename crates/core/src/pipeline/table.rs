//! CSV input and output for speaker lists.
//!
//! Input headers are matched against an ordered alias list per logical
//! field, resolved once at read time; output uses a fixed column set.

use std::path::Path;

use tracing::{info, warn};

use crate::speaker::{deduplicate_speakers, Speaker};

use super::types::PipelineError;

/// Accepted header spellings per logical field, in priority order. Matching
/// is case-insensitive.
const NAME_ALIASES: &[&str] = &["name", "speaker_name", "speaker name", "full_name", "speaker"];
const TITLE_ALIASES: &[&str] = &[
    "title",
    "speaker_title",
    "speaker title",
    "job_title",
    "role",
    "position",
];
const COMPANY_ALIASES: &[&str] = &[
    "company",
    "speaker_company",
    "speaker company",
    "organization",
    "firm",
    "employer",
];

/// Fixed output columns.
const OUTPUT_HEADERS: [&str; 6] = [
    "Speaker Name",
    "Speaker Title",
    "Speaker Company",
    "Company Category",
    "Email Subject",
    "Email Body",
];

fn resolve_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    for alias in aliases {
        if let Some(idx) = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(alias))
        {
            return Some(idx);
        }
    }
    None
}

/// Read a speaker list from a UTF-8 CSV file.
///
/// Rows with an empty name or company are skipped with a warning; duplicate
/// identity tuples are dropped keep-first. Missing required columns are a
/// fatal input-schema error.
pub fn read_speakers(path: &Path) -> Result<Vec<Speaker>, PipelineError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let name_col = resolve_column(&headers, NAME_ALIASES);
    let title_col = resolve_column(&headers, TITLE_ALIASES);
    let company_col = resolve_column(&headers, COMPANY_ALIASES);

    let mut missing = Vec::new();
    if name_col.is_none() {
        missing.push("name".to_string());
    }
    if title_col.is_none() {
        missing.push("title".to_string());
    }
    if company_col.is_none() {
        missing.push("company".to_string());
    }
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns { missing });
    }
    let (name_col, title_col, company_col) =
        (name_col.unwrap(), title_col.unwrap(), company_col.unwrap());

    let mut speakers = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = record.get(name_col).unwrap_or("").trim();
        let title = record.get(title_col).unwrap_or("").trim();
        let company = record.get(company_col).unwrap_or("").trim();

        if name.is_empty() || company.is_empty() {
            warn!(name = %name, company = %company, "Skipping row with empty name or company");
            continue;
        }

        speakers.push(Speaker::new(name, title, company));
    }

    let (unique, removed) = deduplicate_speakers(speakers);
    if removed > 0 {
        warn!(removed = removed, "Removed duplicate entries from input");
    }
    info!(
        count = unique.len(),
        path = %path.display(),
        "Read speaker list"
    );

    Ok(unique)
}

/// Write processed speakers to a UTF-8 CSV file with fixed columns.
///
/// An unset category renders as "Unknown"; unset subject/body render "N/A".
pub fn write_speakers(path: &Path, speakers: &[Speaker]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(OUTPUT_HEADERS)?;

    for speaker in speakers {
        writer.write_record([
            speaker.name.as_str(),
            speaker.title.as_str(),
            speaker.company.as_str(),
            speaker
                .company_category
                .map(|c| c.label())
                .unwrap_or("Unknown"),
            speaker.email_subject.as_deref().unwrap_or("N/A"),
            speaker.email_body.as_deref().unwrap_or("N/A"),
        ])?;
    }

    writer.flush()?;
    info!(count = speakers.len(), path = %path.display(), "Wrote output table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CompanyCategory;
    use tempfile::tempdir;

    fn write_input(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("speakers.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_with_canonical_headers() {
        let dir = tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "name,title,company\nAda,CTO,Acme\nGrace,Admiral,Navy\n",
        );

        let speakers = read_speakers(&path).unwrap();
        assert_eq!(speakers.len(), 2);
        assert_eq!(speakers[0].name, "Ada");
        assert_eq!(speakers[1].company, "Navy");
    }

    #[test]
    fn test_read_with_alias_headers_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "Speaker Name,Job_Title,Organization\nAda,CTO,Acme\n",
        );

        let speakers = read_speakers(&path).unwrap();
        assert_eq!(speakers.len(), 1);
        assert_eq!(speakers[0].title, "CTO");
        assert_eq!(speakers[0].company, "Acme");
    }

    #[test]
    fn test_read_missing_columns_is_fatal() {
        let dir = tempdir().unwrap();
        let path = write_input(dir.path(), "name,title\nAda,CTO\n");

        let err = read_speakers(&path).unwrap_err();
        match err {
            PipelineError::MissingColumns { missing } => {
                assert_eq!(missing, vec!["company".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_read_dedups_identity_tuples() {
        let dir = tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "name,title,company\nA,T,C\na, t ,c\nB,T2,C2\n",
        );

        let speakers = read_speakers(&path).unwrap();
        assert_eq!(speakers.len(), 2);
    }

    #[test]
    fn test_read_skips_rows_missing_name_or_company() {
        let dir = tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "name,title,company\n,CTO,Acme\nAda,CTO,\nGrace,Admiral,Navy\n",
        );

        let speakers = read_speakers(&path).unwrap();
        assert_eq!(speakers.len(), 1);
        assert_eq!(speakers[0].name, "Grace");
    }

    #[test]
    fn test_write_renders_sentinels_for_unset_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("emails.csv");

        let speakers = vec![Speaker::new("Ada", "CTO", "Acme")];
        write_speakers(&path, &speakers).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Speaker Name,Speaker Title,Speaker Company,Company Category,Email Subject,Email Body"
        );
        assert_eq!(lines.next().unwrap(), "Ada,CTO,Acme,Unknown,N/A,N/A");
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emails.csv");

        let mut speaker = Speaker::new("Ada", "CTO", "Acme");
        speaker.company_category = Some(CompanyCategory::Builder);
        speaker.email_subject = Some("Subject".to_string());
        speaker.email_body = Some("Body text".to_string());

        write_speakers(&path, &[speaker]).unwrap();

        // The output headers are themselves accepted input aliases
        let read_back = read_speakers(&path).unwrap();
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].name, "Ada");
        assert_eq!(read_back[0].title, "CTO");
        assert_eq!(read_back[0].company, "Acme");
    }

    #[test]
    fn test_read_empty_input() {
        let dir = tempdir().unwrap();
        let path = write_input(dir.path(), "name,title,company\n");

        let speakers = read_speakers(&path).unwrap();
        assert!(speakers.is_empty());
    }
}
