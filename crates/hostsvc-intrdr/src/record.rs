//! Fixed-length record formatting.
//!
//! Text is split on the code page's line-feed byte and every line becomes one
//! record, right-padded with the code page's blank. Formatting is lazy: the
//! records are produced one at a time as the sink consumes them.

use std::io;

use hostsvc_encoding::{ebcdic, CodePage};

use crate::error::FormatError;

/// Turns text lines or source records into fixed-length records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFormatter {
    lrecl: usize,
    blank: u8,
    newline: u8,
}

impl RecordFormatter {
    /// A formatter producing `lrecl`-byte records in `code_page`.
    pub fn new(lrecl: usize, code_page: &CodePage) -> Self {
        Self {
            lrecl,
            blank: ebcdic::space(code_page),
            newline: code_page.from_latin1_byte(b'\n'),
        }
    }

    /// Record length.
    pub fn lrecl(&self) -> usize {
        self.lrecl
    }

    /// Validate `text` and return its records.
    ///
    /// Every line is checked before the first record is produced, so a
    /// rejected text never yields a partial submission. A final line feed
    /// ends the last line; text after it is one more line. An empty line
    /// becomes a single blank before padding.
    pub fn format_text<'a>(&self, text: &'a [u8]) -> Result<TextRecords<'a>, FormatError> {
        let mut count = 0;
        for (index, line) in lines(text, self.newline).enumerate() {
            if line.len() > self.lrecl {
                return Err(FormatError::LineTooLong {
                    line: index + 1,
                    length: line.len(),
                    max: self.lrecl,
                });
            }
            count += 1;
        }
        Ok(TextRecords {
            formatter: *self,
            text,
            pos: 0,
            remaining: count,
        })
    }

    /// Pad records read from another dataset.
    ///
    /// Read errors and over-long records are passed through as errors; the
    /// consumer decides whether to keep going.
    pub fn format_stream<I>(&self, source: I) -> PaddedRecords<I>
    where
        I: Iterator<Item = io::Result<Vec<u8>>>,
    {
        PaddedRecords {
            formatter: *self,
            source,
        }
    }

    fn pad(&self, line: &[u8]) -> Vec<u8> {
        let mut record = Vec::with_capacity(self.lrecl);
        if line.is_empty() {
            record.push(self.blank);
        } else {
            record.extend_from_slice(line);
        }
        record.resize(self.lrecl, self.blank);
        record
    }
}

fn lines(text: &[u8], newline: u8) -> impl Iterator<Item = &[u8]> {
    let body = match text.last() {
        Some(&last) if last == newline => &text[..text.len() - 1],
        _ => text,
    };
    let empty = text.is_empty();
    body.split(move |&b| b == newline).filter(move |_| !empty)
}

/// Records formatted from in-memory text.
#[derive(Debug, Clone)]
pub struct TextRecords<'a> {
    formatter: RecordFormatter,
    text: &'a [u8],
    pos: usize,
    remaining: usize,
}

impl TextRecords<'_> {
    /// Number of records not yet produced.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Iterator for TextRecords<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.remaining == 0 {
            return None;
        }
        let rest = &self.text[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == self.formatter.newline)
            .unwrap_or(rest.len());
        self.pos += end + 1;
        self.remaining -= 1;
        Some(self.formatter.pad(&rest[..end]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for TextRecords<'_> {}

/// Records padded from a streaming source.
#[derive(Debug)]
pub struct PaddedRecords<I> {
    formatter: RecordFormatter,
    source: I,
}

impl<I> Iterator for PaddedRecords<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.source.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err)),
        };
        if record.len() > self.formatter.lrecl {
            return Some(Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "record of {} bytes exceeds record length {}",
                    record.len(),
                    self.formatter.lrecl
                ),
            )));
        }
        Some(Ok(self.formatter.pad(&record)))
    }
}
