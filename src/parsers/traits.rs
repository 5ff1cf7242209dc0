use crate::errors::ParseError;
use crate::statement::{Statement, TransactionLine};

/// A raw record that may carry no data at all
pub trait RawRecord {
    fn is_blank(&self) -> bool;

    /// 1-based line of the input the record starts on, when the reader
    /// tracks it. Otherwise records are numbered in the order they arrive.
    fn line(&self) -> Option<usize> {
        None
    }
}

impl RawRecord for csv::StringRecord {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn line(&self) -> Option<usize> {
        self.position().map(|pos| pos.line() as usize)
    }
}

impl RawRecord for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

/// Record-oriented statement parser.
///
/// Implementors split their input into raw records and turn each record into
/// a [`TransactionLine`]; [`StatementParser::parse`] drives the pipeline.
pub trait StatementParser {
    type Record: RawRecord;
    type Records: Iterator<Item = Result<Self::Record, ParseError>>;

    /// Single-pass sequence of raw records from the input
    fn split_records(&mut self) -> Result<Self::Records, ParseError>;

    /// `Ok(None)` drops the record without error
    fn parse_record(&self, record: &Self::Record) -> Result<Option<TransactionLine>, ParseError>;

    /// Statement that parsed lines are appended to
    fn start_statement(&self) -> Statement {
        Statement::default()
    }

    /// Read all records and return the populated statement.
    ///
    /// Errors carry the 1-based number of the record that caused them: its
    /// input line when [`RawRecord::line`] knows it, its position otherwise.
    fn parse(&mut self) -> Result<Statement, ParseError> {
        let mut statement = self.start_statement();

        for (index, record) in self.split_records()?.enumerate() {
            let record = record.map_err(|e| e.at_record(index + 1))?;
            let record_no = record.line().unwrap_or(index + 1);
            if record.is_blank() {
                log::debug!("record {record_no}: blank, skipped");
                continue;
            }

            let Some(line) = self
                .parse_record(&record)
                .map_err(|e| e.at_record(record_no))?
            else {
                log::debug!("record {record_no}: dropped by parser");
                continue;
            };

            line.assert_valid()
                .map_err(|e| ParseError::from(e).at_record(record_no))?;
            log::debug!("record {record_no}: {:?} {:?}", line.date, line.amount);
            statement.lines.push(line);
        }

        log::info!("parsed statement with {} lines", statement.lines.len());
        Ok(statement)
    }
}
