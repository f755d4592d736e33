//! Record-oriented read access to allocated datasets.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use hostsvc_encoding::CodePage;

use crate::error::DatasetError;
use crate::types::{AllocationHandle, DatasetAttributes, RecordFormat};

/// Single-pass stream of records in the host code page.
pub type RecordStream = Box<dyn Iterator<Item = io::Result<Vec<u8>>> + Send>;

/// An opened dataset: its attributes and its records.
pub struct DatasetInput {
    /// Record attributes of the opened dataset.
    pub attributes: DatasetAttributes,
    records: RecordStream,
}

impl DatasetInput {
    /// Wrap a record stream.
    pub fn new(attributes: DatasetAttributes, records: RecordStream) -> Self {
        Self {
            attributes,
            records,
        }
    }

    /// Logical record length.
    pub fn lrecl(&self) -> usize {
        self.attributes.lrecl
    }
}

impl Iterator for DatasetInput {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }
}

impl std::fmt::Debug for DatasetInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetInput")
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Opens datasets through their DD name.
pub trait DatasetAccess: Send + Sync {
    /// Open the dataset bound to `handle` for sequential reading.
    fn open(&self, handle: &AllocationHandle) -> Result<DatasetInput, DatasetError>;
}

/// Open a text file as a dataset, one record per line.
///
/// Fails up front for undefined-length datasets. Lines are converted to
/// `code_page` lazily; a line that is not valid UTF-8, cannot be represented
/// in the code page, or exceeds the LRECL surfaces as an error item.
pub fn open_text(
    name: &str,
    path: &Path,
    attributes: DatasetAttributes,
    code_page: &'static CodePage,
) -> Result<DatasetInput, DatasetError> {
    if attributes.recfm == RecordFormat::Undefined {
        return Err(DatasetError::UndefinedRecordFormat {
            name: name.to_string(),
        });
    }
    let file = File::open(path).map_err(|source| DatasetError::OpenFailed {
        name: name.to_string(),
        source,
    })?;
    if !file.metadata().map(|m| m.is_file()).unwrap_or(false) {
        return Err(DatasetError::OpenFailed {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a sequential dataset"),
        });
    }

    let lrecl = attributes.lrecl;
    let records = BufReader::new(file).split(b'\n').map(move |line| {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        let text = String::from_utf8(line)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let record = code_page
            .encode(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if record.len() > lrecl {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("record of {} bytes exceeds LRECL {}", record.len(), lrecl),
            ));
        }
        Ok(record)
    });

    Ok(DatasetInput::new(attributes, Box::new(records)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostsvc_encoding::CP1047;

    #[test]
    fn reads_lines_as_ebcdic_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PAYROLL");
        std::fs::write(&path, "//PAY JOB\r\n\n//S1 EXEC PGM=IEFBR14\n").unwrap();

        let input = open_text("X.Y", &path, DatasetAttributes::default(), &CP1047).unwrap();
        assert_eq!(input.lrecl(), 80);
        let records: Vec<Vec<u8>> = input.map(Result::unwrap).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(&records[0][..2], &[0x61, 0x61]);
        assert_eq!(records[0].len(), 9);
        assert!(records[1].is_empty());
    }

    #[test]
    fn missing_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_text("X.Y", &dir.path().join("NOPE"), DatasetAttributes::default(), &CP1047)
            .unwrap_err();
        assert!(matches!(err, DatasetError::OpenFailed { .. }));
    }

    #[test]
    fn directory_is_not_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_text("X.Y", dir.path(), DatasetAttributes::default(), &CP1047).unwrap_err();
        assert!(matches!(err, DatasetError::OpenFailed { .. }));
    }

    #[test]
    fn undefined_record_format_rejected() {
        let attrs = DatasetAttributes {
            recfm: RecordFormat::Undefined,
            lrecl: 0,
        };
        let err = open_text("SYS1.LOAD", Path::new("/nonexistent"), attrs, &CP1047).unwrap_err();
        assert!(matches!(err, DatasetError::UndefinedRecordFormat { .. }));
    }

    #[test]
    fn overlong_record_is_a_stream_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DATA");
        std::fs::write(&path, "SHORT\nTOO LONG FOR TEN\nAFTER\n").unwrap();
        let attrs = DatasetAttributes {
            recfm: RecordFormat::Fixed,
            lrecl: 10,
        };
        let mut input = open_text("X.Y", &path, attrs, &CP1047).unwrap();
        assert!(input.next().unwrap().is_ok());
        assert!(input.next().unwrap().is_err());
    }
}
