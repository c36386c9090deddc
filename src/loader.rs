//! Connections export loader
//!
//! Reads the CSV export, skips the notes preamble that precedes the column
//! header row, and produces one [`Record`] per data row. Rows that cannot be
//! decoded are collected as [`RowError`]s instead of aborting the load.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::RowError;

/// Header of the required first-name column
pub const FIRST_NAME_COLUMN: &str = "First Name";
/// Header of the required last-name column
pub const LAST_NAME_COLUMN: &str = "Last Name";
/// Header of the optional position column
pub const POSITION_COLUMN: &str = "Position";
/// Header of the optional company column
pub const COMPANY_COLUMN: &str = "Company";

/// Cell values read as missing in the position and company columns
///
/// These are the tokens spreadsheet and dataframe tools write for an empty
/// value. Name cells are kept verbatim.
pub const MISSING_VALUE_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Errors that abort loading the whole export
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {path}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read input")]
    Io(#[from] io::Error),

    #[error("Malformed CSV input")]
    Csv(#[from] csv::Error),

    #[error("No header row found after skipping {0} line(s)")]
    MissingHeader(usize),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// One contact row of the export
///
/// Missing position or company cells are normalized to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub company: String,
}

impl Record {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        position: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            position: position.into(),
            company: company.into(),
        }
    }

    /// Space-joined first and last name, used as the node identity
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Result of loading an export: decoded records plus rejected rows
#[derive(Debug, Default)]
pub struct LoadedContacts {
    pub records: Vec<Record>,
    pub failed: Vec<RowError>,
}

/// Column positions resolved from the header row
struct Columns {
    first_name: usize,
    last_name: usize,
    position: Option<usize>,
    company: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        Ok(Self {
            first_name: find(FIRST_NAME_COLUMN)
                .ok_or(LoadError::MissingColumn(FIRST_NAME_COLUMN))?,
            last_name: find(LAST_NAME_COLUMN)
                .ok_or(LoadError::MissingColumn(LAST_NAME_COLUMN))?,
            position: find(POSITION_COLUMN),
            company: find(COMPANY_COLUMN),
        })
    }

    fn record(&self, row: &StringRecord) -> Record {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .unwrap_or_default()
                .to_string()
        };

        Record {
            first_name: cell(Some(self.first_name)),
            last_name: cell(Some(self.last_name)),
            position: or_missing(cell(self.position)),
            company: or_missing(cell(self.company)),
        }
    }
}

fn or_missing(value: String) -> String {
    if MISSING_VALUE_MARKERS.contains(&value.as_str()) {
        String::new()
    } else {
        value
    }
}

/// Load contacts from a CSV file, skipping `skip_rows` preamble lines
pub fn load_contacts(path: &Path, skip_rows: usize) -> Result<LoadedContacts, LoadError> {
    info!("Loading CSV file {}...", path.display());

    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let loaded = load_contacts_from_reader(BufReader::new(file), skip_rows)?;
    info!("Successfully loaded {} connections", loaded.records.len());
    Ok(loaded)
}

/// Load contacts from any reader, skipping `skip_rows` preamble lines
pub fn load_contacts_from_reader<R: Read>(
    mut reader: R,
    skip_rows: usize,
) -> Result<LoadedContacts, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let body = strip_preamble(&bytes, skip_rows);
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(body);

    let headers = csv_reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::MissingHeader(skip_rows));
    }
    let columns = Columns::resolve(&headers)?;
    debug!("Resolved columns from header: {:?}", headers);

    let mut loaded = LoadedContacts::default();
    let mut raw = ByteRecord::new();
    let mut row = 0;

    loop {
        row += 1;
        match csv_reader.read_byte_record(&mut raw) {
            Ok(false) => break,
            Ok(true) => match StringRecord::from_byte_record(raw.clone()) {
                Ok(decoded) => loaded.records.push(columns.record(&decoded)),
                Err(e) => {
                    let err = RowError::Decode {
                        row,
                        message: e.to_string(),
                    };
                    warn!("Skipping undecodable row: {}", err);
                    loaded.failed.push(err);
                }
            },
            Err(e) if e.is_io_error() => return Err(LoadError::Csv(e)),
            Err(e) => {
                let err = RowError::Decode {
                    row,
                    message: e.to_string(),
                };
                warn!("Skipping malformed row: {}", err);
                loaded.failed.push(err);
            }
        }
    }

    Ok(loaded)
}

/// Drop `skip_rows` physical lines, then any blank lines before the header
fn strip_preamble(bytes: &[u8], skip_rows: usize) -> &[u8] {
    fn split_line(input: &[u8]) -> (&[u8], &[u8]) {
        match input.iter().position(|&b| b == b'\n') {
            Some(idx) => (&input[..idx], &input[idx + 1..]),
            None => (input, &[]),
        }
    }

    let mut rest = bytes;
    for _ in 0..skip_rows {
        if rest.is_empty() {
            break;
        }
        rest = split_line(rest).1;
    }

    while !rest.is_empty() {
        let (line, tail) = split_line(rest);
        if !line.iter().all(|b| b.is_ascii_whitespace()) {
            break;
        }
        rest = tail;
    }

    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "Notes:\n\
\"When exporting your connection data, you may notice that some of the email addresses are missing.\"\n\
\n\
First Name,Last Name,URL,Email Address,Company,Position,Connected On\n\
Alice,Smith,https://example.com/alice,,Acme,Engineer,01 Jan 2024\n\
Bob,Jones,https://example.com/bob,,Acme,Manager,02 Jan 2024\n\
Carol,Lee,https://example.com/carol,,,,03 Jan 2024\n";

    #[test]
    fn test_load_linkedin_export() {
        let loaded = load_contacts_from_reader(EXPORT.as_bytes(), 2).unwrap();

        assert_eq!(loaded.records.len(), 3);
        assert!(loaded.failed.is_empty());
        assert_eq!(
            loaded.records[0],
            Record::new("Alice", "Smith", "Engineer", "Acme")
        );
        assert_eq!(loaded.records[2], Record::new("Carol", "Lee", "", ""));
    }

    #[test]
    fn test_full_name() {
        let record = Record::new("Alice", "Smith", "", "");
        assert_eq!(record.full_name(), "Alice Smith");
    }

    #[test]
    fn test_optional_columns_absent() {
        let csv = "First Name,Last Name\nAlice,Smith\n";
        let loaded = load_contacts_from_reader(csv.as_bytes(), 0).unwrap();

        assert_eq!(loaded.records, vec![Record::new("Alice", "Smith", "", "")]);
    }

    #[test]
    fn test_short_rows_yield_empty_fields() {
        let csv = "First Name,Last Name,Company,Position\nAlice,Smith\n";
        let loaded = load_contacts_from_reader(csv.as_bytes(), 0).unwrap();

        assert_eq!(loaded.records[0].company, "");
        assert_eq!(loaded.records[0].position, "");
    }

    #[test]
    fn test_missing_value_markers() {
        let csv = "First Name,Last Name,Company,Position\n\
                   Alice,Smith,N/A,NA\n\
                   Bob,Jones,null,Eng\n\
                   Na,Null,Nan Corp,None\n";
        let loaded = load_contacts_from_reader(csv.as_bytes(), 0).unwrap();

        let records = &loaded.records;
        assert_eq!(records[0].company, "");
        assert_eq!(records[0].position, "");
        assert_eq!(records[1].company, "");
        assert_eq!(records[1].position, "Eng");
        // Names and partial matches are left alone
        assert_eq!(records[2].full_name(), "Na Null");
        assert_eq!(records[2].company, "Nan Corp");
        assert_eq!(records[2].position, "");
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "First Name,Company\nAlice,Acme\n";
        let err = load_contacts_from_reader(csv.as_bytes(), 0).unwrap_err();

        assert!(matches!(err, LoadError::MissingColumn(LAST_NAME_COLUMN)));
    }

    #[test]
    fn test_missing_header() {
        let err = load_contacts_from_reader("Notes:\nsomething\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, LoadError::MissingHeader(2)));
    }

    #[test]
    fn test_undecodable_row_is_skipped() {
        let mut csv = b"First Name,Last Name,Company\nAlice,Smith,Acme\n".to_vec();
        csv.extend_from_slice(b"B\xffb,Jones,Acme\n");
        csv.extend_from_slice(b"Carol,Lee,BigCo\n");

        let loaded = load_contacts_from_reader(csv.as_slice(), 0).unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.failed.len(), 1);
        assert!(matches!(loaded.failed[0], RowError::Decode { row: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_contacts(Path::new("definitely/not/here.csv"), 2).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn test_strip_preamble() {
        assert_eq!(strip_preamble(b"a\nb\n\n  \nc,d\n", 2), b"c,d\n");
        assert_eq!(strip_preamble(b"a\n", 5), b"");
        assert_eq!(strip_preamble(b"x,y\n", 0), b"x,y\n");
    }
}
