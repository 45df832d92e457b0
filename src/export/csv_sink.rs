use futures::{pin_mut, Stream, StreamExt};
use std::io::{self, Write};
use thiserror::Error;

use crate::history::FetchError;
use crate::models::OutputRecord;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("row {row} has columns [{found}], header is [{expected}]")]
    HeaderMismatch {
        row: usize,
        expected: String,
        found: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Writes records as CSV. The header is taken from the first record and every
/// later record must have the same columns in the same order.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    header: Option<Vec<&'static str>>,
    rows: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(inner);

        Self {
            writer,
            header: None,
            rows: 0,
        }
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn write(&mut self, record: &OutputRecord) -> Result<(), SinkError> {
        match &self.header {
            None => {
                let header: Vec<&'static str> = record.columns().collect();
                self.writer.write_record(&header)?;
                self.header = Some(header);
            }
            Some(header) => {
                if !header.iter().copied().eq(record.columns()) {
                    return Err(SinkError::HeaderMismatch {
                        row: self.rows + 1,
                        expected: header.join(", "),
                        found: record.columns().collect::<Vec<_>>().join(", "),
                    });
                }
            }
        }

        self.writer.write_record(record.values())?;
        self.rows += 1;
        Ok(())
    }

    /// Drain `records` into the sink and flush. Rows written before an error
    /// stay written.
    pub async fn write_all<S>(&mut self, records: S) -> Result<usize, SinkError>
    where
        S: Stream<Item = Result<OutputRecord, FetchError>>,
    {
        pin_mut!(records);
        let result = async {
            while let Some(record) = records.next().await {
                self.write(&record?)?;
            }
            Ok::<_, SinkError>(())
        }
        .await;

        self.flush()?;
        result.map(|_| self.rows)
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|err| SinkError::Io(err.into_error()))
    }
}
