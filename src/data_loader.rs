//! Loading bird import spreadsheets into [`ImportRow`]s.
//!
//! Column positions are discovered from the header line, so users can
//! reorder or omit optional columns. Only `sex` and `hatch_date` are
//! required; everything else defaults to empty.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Result;
use csv::StringRecord;

use crate::import::ImportRow;

/// Column offsets for one spreadsheet, `None` when the column is absent.
pub struct BirdColumnProfile {
    pub name_column: Option<usize>,
    pub sex_column: Option<usize>,
    pub hatch_date_column: Option<usize>,
    pub status_column: Option<usize>,
    pub coop_column: Option<usize>,
    pub sire_column: Option<usize>,
    pub dam_column: Option<usize>,
    pub band_column: Option<usize>,
    pub breed_column: Option<usize>,
    pub breed_code_column: Option<usize>,
    pub color_column: Option<usize>,
    pub notes_column: Option<usize>,
}

impl Default for BirdColumnProfile {
    /// Offsets of the published import template, in template order.
    fn default() -> Self {
        Self {
            name_column: Some(0),
            sex_column: Some(1),
            hatch_date_column: Some(2),
            status_column: Some(3),
            coop_column: Some(4),
            sire_column: Some(5),
            dam_column: Some(6),
            band_column: Some(7),
            breed_column: Some(8),
            breed_code_column: Some(9),
            color_column: Some(10),
            notes_column: Some(11),
        }
    }
}

fn offset(column: Option<usize>) -> String {
    column.map_or_else(|| "-".to_string(), |i| i.to_string())
}

impl Display for BirdColumnProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bird column offsets: name:{}, sex:{}, hatch_date:{}, status:{}, coop:{}, sire:{}, dam:{}, band:{}, breed:{}, breed_code:{}, color:{}, notes:{}",
            offset(self.name_column),
            offset(self.sex_column),
            offset(self.hatch_date_column),
            offset(self.status_column),
            offset(self.coop_column),
            offset(self.sire_column),
            offset(self.dam_column),
            offset(self.band_column),
            offset(self.breed_column),
            offset(self.breed_code_column),
            offset(self.color_column),
            offset(self.notes_column),
        )
    }
}

pub fn create_bird_column_profile(headers: &[String]) -> BirdColumnProfile {
    let mut profile = BirdColumnProfile {
        name_column: None,
        sex_column: None,
        hatch_date_column: None,
        status_column: None,
        coop_column: None,
        sire_column: None,
        dam_column: None,
        band_column: None,
        breed_column: None,
        breed_code_column: None,
        color_column: None,
        notes_column: None,
    };
    for (i, field) in headers.iter().enumerate() {
        match field.trim().to_lowercase().as_str() {
            "name" => profile.name_column = Some(i),
            "sex" => profile.sex_column = Some(i),
            "hatch_date" => profile.hatch_date_column = Some(i),
            "status" => profile.status_column = Some(i),
            "coop" => profile.coop_column = Some(i),
            "sire" => profile.sire_column = Some(i),
            "dam" => profile.dam_column = Some(i),
            "band" => profile.band_column = Some(i),
            "breed" => profile.breed_column = Some(i),
            "breed_code" => profile.breed_code_column = Some(i),
            "color" => profile.color_column = Some(i),
            "notes" => profile.notes_column = Some(i),
            _ => {}
        }
    }
    profile
}

pub fn get_headers_from_file(filename: &str, separator: u8) -> Result<Vec<String>> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    if let Some(Ok(header)) = lines.next() {
        let headers: Vec<String> = header
            .split(separator as char)
            .map(|col_name| col_name.trim().to_string())
            .collect();

        Ok(headers)
    } else {
        Err(anyhow::anyhow!("Failed to read header from file"))
    }
}

pub fn load_csv(filename: &str) -> Result<Vec<StringRecord>> {
    load_records(filename, b',')
}

pub fn load_tsv(filename: &str) -> Result<Vec<StringRecord>> {
    load_records(filename, b'\t')
}

fn load_records(filename: &str, delimiter: u8) -> Result<Vec<StringRecord>> {
    let path = Path::new(filename);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let records: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;

    Ok(records)
}

pub fn verify_bird_headers(headers: &[String]) -> Result<()> {
    let columns: HashSet<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    for col in ["sex", "hatch_date"] {
        if !columns.contains(col) {
            return Err(anyhow::anyhow!("Missing required column '{}'", col));
        }
    }
    Ok(())
}

fn is_valid_band(band: &str) -> bool {
    let trimmed = band.trim();
    !trimmed.is_empty()
        && trimmed != "null"
        && trimmed != "None"
        && trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Bands are optional, but the ones present must be well-formed and unique
/// within the file since later rows may reference them as sire/dam.
pub fn verify_band_column(records: &[StringRecord], band_column: usize) -> Result<()> {
    let mut band_set = HashSet::new();
    let mut duplicates = Vec::new();
    let mut invalid = Vec::new();

    for record in records {
        if let Some(band) = record.get(band_column) {
            if band.trim().is_empty() {
                continue;
            }
            if !is_valid_band(band) {
                invalid.push(band.to_string());
            } else if !band_set.insert(band.trim().to_lowercase()) {
                duplicates.push(band.trim().to_string());
            }
        }
    }

    if !invalid.is_empty() {
        return Err(anyhow::anyhow!(
            "Invalid band identifiers in 'band' column: {:?}",
            invalid
        ));
    }

    if !duplicates.is_empty() {
        return Err(anyhow::anyhow!(
            "Duplicate band identifiers in 'band' column: {:?}",
            duplicates
        ));
    }

    Ok(())
}

fn cell(record: &StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build [`ImportRow`]s from parsed records. Row numbers are 1-based
/// spreadsheet line numbers; the header occupies line 1.
pub fn rows_from_records(records: &[StringRecord], profile: &BirdColumnProfile) -> Vec<ImportRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| ImportRow {
            row_number: i + 2,
            name: cell(record, profile.name_column),
            sex: cell(record, profile.sex_column).unwrap_or_default(),
            hatch_date: cell(record, profile.hatch_date_column).unwrap_or_default(),
            status: cell(record, profile.status_column).unwrap_or_default(),
            coop_name: cell(record, profile.coop_column),
            sire_name: cell(record, profile.sire_column),
            dam_name: cell(record, profile.dam_column),
            band_number: cell(record, profile.band_column),
            breed_name: cell(record, profile.breed_column),
            breed_code: cell(record, profile.breed_code_column),
            color: cell(record, profile.color_column),
            notes: cell(record, profile.notes_column),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn profile_follows_header_order_not_template_order() {
        let headers: Vec<String> = ["hatch_date", "sex", "name"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let profile = create_bird_column_profile(&headers);
        assert_eq!(profile.hatch_date_column, Some(0));
        assert_eq!(profile.sex_column, Some(1));
        assert_eq!(profile.name_column, Some(2));
        assert_eq!(profile.coop_column, None);
    }

    #[test]
    fn headers_require_sex_and_hatch_date() {
        let ok: Vec<String> = ["name", "Sex", "HATCH_DATE"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(verify_bird_headers(&ok).is_ok());

        let missing: Vec<String> = ["name", "sex"].iter().map(|s| s.to_string()).collect();
        let err = verify_bird_headers(&missing).unwrap_err();
        assert!(err.to_string().contains("hatch_date"));
    }

    #[test]
    fn rows_carry_spreadsheet_line_numbers() {
        let file = write_csv("name,sex,hatch_date\nAce,MALE,2024-03-01\nBea,FEMALE,2024-03-02\n");
        let records = load_csv(file.path().to_str().unwrap()).unwrap();
        let headers = get_headers_from_file(file.path().to_str().unwrap(), b',').unwrap();
        let rows = rows_from_records(&records, &create_bird_column_profile(&headers));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].row_number, 3);
        assert_eq!(rows[0].name.as_deref(), Some("Ace"));
        assert_eq!(rows[1].sex, "FEMALE");
    }

    #[test]
    fn empty_cells_become_none() {
        let file = write_csv("name,sex,hatch_date,coop\n,MALE,2024-03-01,\n");
        let records = load_csv(file.path().to_str().unwrap()).unwrap();
        let headers = get_headers_from_file(file.path().to_str().unwrap(), b',').unwrap();
        let rows = rows_from_records(&records, &create_bird_column_profile(&headers));

        assert_eq!(rows[0].name, None);
        assert_eq!(rows[0].coop_name, None);
    }

    #[test]
    fn duplicate_bands_are_rejected() {
        let file = write_csv("sex,hatch_date,band\nMALE,2024-03-01,B-1\nFEMALE,2024-03-02,b-1\n");
        let records = load_csv(file.path().to_str().unwrap()).unwrap();
        let err = verify_band_column(&records, 2).unwrap_err();
        assert!(err.to_string().contains("Duplicate band identifiers"));
    }

    #[test]
    fn malformed_bands_are_rejected() {
        let file = write_csv("sex,hatch_date,band\nMALE,2024-03-01,b@d band\n");
        let records = load_csv(file.path().to_str().unwrap()).unwrap();
        let err = verify_band_column(&records, 2).unwrap_err();
        assert!(err.to_string().contains("Invalid band identifiers"));
    }

    #[test]
    fn tsv_loads_with_tab_delimiter() {
        let file = write_csv("sex\thatch_date\nMALE\t2024-03-01\n");
        let records = load_tsv(file.path().to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(0), Some("MALE"));
    }
}
