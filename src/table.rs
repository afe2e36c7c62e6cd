//! CSV reading and writing for price tables.
//!
//! A table is one header line followed by zero or more data lines. The reader
//! hands back raw string fields; typing them is the validator's job.

use std::io::Write;

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use crate::error::{PricesError, Result};

// ---------------------------------------------------------------------------
// TableReader
// ---------------------------------------------------------------------------

/// Row-at-a-time reader over an in-memory table.
///
/// Every row must have as many fields as the header; a mismatch is reported
/// as [`PricesError::MalformedTable`]. Quoting is strict: a quote inside an
/// unquoted field, stray text after a closing quote, or a quoted field that
/// runs to the end of the input are all malformed.
pub struct TableReader<'a> {
    input: &'a [u8],
    rdr: csv::Reader<&'a [u8]>,
    record: StringRecord,
}

impl<'a> TableReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(input);
        Self {
            input,
            rdr,
            record: StringRecord::new(),
        }
    }

    /// Read the header line. Its contents are not checked against any
    /// expected column names.
    pub fn parse_header(&mut self) -> Result<Vec<String>> {
        match self.parse_row()? {
            Some(fields) => Ok(fields),
            None => Err(PricesError::MalformedTable("missing header row".into())),
        }
    }

    /// Read the next data line, or `None` once the input is exhausted.
    pub fn parse_row(&mut self) -> Result<Option<Vec<String>>> {
        let start = self.rdr.position().byte() as usize;
        let more = self
            .rdr
            .read_record(&mut self.record)
            .map_err(|e| PricesError::MalformedTable(e.to_string()))?;
        if !more {
            return Ok(None);
        }

        let end = (self.rdr.position().byte() as usize).min(self.input.len());
        check_quotes(&self.input[start.min(end)..end]).map_err(|msg| {
            let line = self.record.position().map_or(0, |p| p.line());
            PricesError::MalformedTable(format!("line {line}: {msg}"))
        })?;

        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Scan the raw bytes of one record for quoting the csv reader tolerates.
fn check_quotes(raw: &[u8]) -> std::result::Result<(), &'static str> {
    use QuoteState::*;

    let mut state = FieldStart;
    for &b in raw {
        let separator = matches!(b, b',' | b'\n' | b'\r');
        state = match (state, b) {
            (FieldStart, b'"') => Quoted,
            (FieldStart, _) if separator => FieldStart,
            (FieldStart, _) => Unquoted,
            (Unquoted, b'"') => return Err("bare \" in non-quoted field"),
            (Unquoted, _) if separator => FieldStart,
            (Unquoted, _) => Unquoted,
            (Quoted, b'"') => QuoteInQuoted,
            (Quoted, _) => Quoted,
            (QuoteInQuoted, b'"') => Quoted,
            (QuoteInQuoted, _) if separator => FieldStart,
            (QuoteInQuoted, _) => return Err("extraneous \" in quoted field"),
        };
    }

    match state {
        Quoted => Err("quoted field is never closed"),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// TableWriter
// ---------------------------------------------------------------------------

/// Writes `\n`-terminated lines, quoting only the fields that need it.
pub struct TableWriter<W: Write> {
    wtr: csv::Writer<W>,
    rows: usize,
}

impl TableWriter<Vec<u8>> {
    /// Writer that collects the table in memory.
    pub fn in_memory() -> Self {
        Self::new(Vec::new())
    }
}

impl<W: Write> TableWriter<W> {
    pub fn new(output: W) -> Self {
        let wtr = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(output);
        Self { wtr, rows: 0 }
    }

    pub fn write_header<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.write_line(fields)
    }

    pub fn write_row<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.write_line(fields)?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far (the header is not counted).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying sink.
    pub fn finish(self) -> Result<W> {
        self.wtr
            .into_inner()
            .map_err(|e| PricesError::Io(std::io::Error::other(e.to_string())))
    }

    fn write_line<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.wtr
            .write_record(fields)
            .map_err(|e| PricesError::Io(std::io::Error::other(e.to_string())))
    }
}
