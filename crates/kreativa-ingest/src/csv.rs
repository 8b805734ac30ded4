//! Lenient CSV import: one creative per line, `name,handle[,platform[,bio]]`.

use csv::{ReaderBuilder, StringRecord, Trim};
use kreativa_core::{detect_platform, CandidateProfile, Platform};

const HEADER_MARKERS: &[&str] = &["name", "handle", "username"];

fn is_header(record: &StringRecord) -> bool {
    record.iter().any(|field| {
        let lower = field.to_lowercase();
        HEADER_MARKERS.iter().any(|m| lower.contains(m))
    })
}

fn to_candidate(record: &StringRecord) -> Option<CandidateProfile> {
    if record.len() < 2 {
        return None;
    }
    let handle = record[1].replacen('@', "", 1).trim().to_string();
    if handle.is_empty() {
        return None;
    }
    let platform = record
        .get(2)
        .and_then(detect_platform)
        .unwrap_or(Platform::Instagram);
    Some(CandidateProfile {
        name: record[0].to_string(),
        handle,
        platform,
        bio: record.get(3).unwrap_or_default().to_string(),
        category: None,
    })
}

/// Parses CSV text into candidate profiles.
///
/// The first line is skipped when it looks like a header. Lines with fewer
/// than two fields or an empty handle are dropped. A missing or
/// unrecognized platform column defaults to Instagram.
#[must_use]
pub fn parse_csv(content: &str) -> Vec<CandidateProfile> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(trimmed.as_bytes());

    let mut candidates = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, row = index + 1, "skipping unreadable CSV row");
                continue;
            }
        };
        if index == 0 && is_header(&record) {
            continue;
        }
        candidates.extend(to_candidate(&record));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_is_skipped() {
        let rows = parse_csv("Name,Handle,Platform,Bio\nJane Doe,@janedoe,Instagram,Hello");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "Jane Doe");
        assert_eq!(row.handle, "janedoe");
        assert_eq!(row.platform, Platform::Instagram);
        assert_eq!(row.bio, "Hello");
        assert!(row.category.is_none());
    }

    #[test]
    fn headerless_file_keeps_first_line() {
        let rows = parse_csv("Ada Lens,ada.lens,TikTok,Shoots film\nTunde,tunde,twitter");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].platform, Platform::TikTok);
        assert_eq!(rows[1].platform, Platform::Twitter);
        assert_eq!(rows[1].bio, "");
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let rows = parse_csv("\"Doe, Jane\",\"@jane\",Instagram,\"Lagos, Nigeria\"\r\n");
        assert_eq!(rows[0].name, "Doe, Jane");
        assert_eq!(rows[0].handle, "jane");
        assert_eq!(rows[0].bio, "Lagos, Nigeria");
    }

    #[test]
    fn doubled_quotes_collapse_inside_quoted_fields() {
        let rows = parse_csv("\"Ada \"\"Lens\"\" Obi\",ada,Instagram,\"Says \"\"hi\"\"\"");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ada \"Lens\" Obi");
        assert_eq!(rows[0].handle, "ada");
        assert_eq!(rows[0].bio, "Says \"hi\"");
    }

    #[test]
    fn quoted_field_may_span_lines() {
        let rows = parse_csv("name,handle,platform,bio\nTolu,tolu,IG,\"Paints\nand sculpts\"\nKemi,kemi");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bio, "Paints\nand sculpts");
        assert_eq!(rows[1].handle, "kemi");
    }

    #[test]
    fn short_or_handleless_rows_are_dropped() {
        let rows = parse_csv("name,handle\nonly-one-field\nNo Handle,\nOk,ok");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].handle, "ok");
    }

    #[test]
    fn unknown_platform_defaults_to_instagram() {
        let rows = parse_csv("A,a,Snapchat");
        assert_eq!(rows[0].platform, Platform::Instagram);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_csv("   \n  ").is_empty());
    }
}
