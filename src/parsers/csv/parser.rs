use std::io::{Cursor, Read};

use csv::{Reader, ReaderBuilder, StringRecord};

use super::dto::{CsvConfig, FieldMapping};
use super::types::coerce;
use crate::errors::{ParseError, ParseErrorKind};
use crate::fitid::IdStrategy;
use crate::parsers::traits::StatementParser;
use crate::statement::{LineField, Statement, TransactionLine};

type RecordResult = Result<StringRecord, ParseError>;

/// Generic column-mapped CSV statement parser.
///
/// The reader is held until [`StatementParser::parse`] reads it to the end;
/// pass `&mut File` to keep ownership of the handle.
pub struct CsvStatementParser<R> {
    reader: Option<R>,
    config: CsvConfig,
}

impl<R: Read> CsvStatementParser<R> {
    pub fn new(reader: R, mappings: FieldMapping) -> Self {
        Self::from_config(reader, CsvConfig::new(mappings))
    }

    pub fn from_config(reader: R, config: CsvConfig) -> Self {
        Self {
            reader: Some(reader),
            config,
        }
    }

    pub fn date_format(mut self, format: &str) -> Self {
        self.config.date_format = format.to_string();
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    pub fn has_headers(mut self, yes: bool) -> Self {
        self.config.has_headers = yes;
        self
    }

    pub fn id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.config.id_strategy = strategy;
        self
    }

    /// Account the statement belongs to
    pub fn account(mut self, bank_id: &str, account_id: &str, currency: &str) -> Self {
        self.config.bank_id = Some(bank_id.to_string());
        self.config.account_id = Some(account_id.to_string());
        self.config.currency = Some(currency.to_string());
        self
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }
}

/// Records of a buffered CSV input.
///
/// The csv reader stamps a record with the position where the read started,
/// which is before any blank lines it skips. Each record's line is moved
/// forward to the first byte of the record itself.
pub struct CsvRecords {
    reader: Reader<Cursor<Vec<u8>>>,
    scanned: usize,
    line: u64,
}

impl CsvRecords {
    fn new(reader: Reader<Cursor<Vec<u8>>>) -> Self {
        Self {
            reader,
            scanned: 0,
            line: 1,
        }
    }

    /// 1-based line of the first non-terminator byte at or after `byte`
    fn line_at(&mut self, byte: u64) -> u64 {
        let content = self.reader.get_ref().get_ref();
        let mut start = usize::try_from(byte).map_or(content.len(), |b| b.min(content.len()));
        while matches!(content.get(start), Some(b'\r' | b'\n')) {
            start += 1;
        }
        if start > self.scanned {
            let newlines = content[self.scanned..start].iter().filter(|&&b| b == b'\n').count();
            self.line += newlines as u64;
            self.scanned = start;
        }
        self.line
    }
}

impl Iterator for CsvRecords {
    type Item = RecordResult;

    fn next(&mut self) -> Option<RecordResult> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                if let Some(mut pos) = record.position().cloned() {
                    pos.set_line(self.line_at(pos.byte()));
                    record.set_position(Some(pos));
                }
                Some(Ok(record))
            }
            Err(err) => {
                let byte = err.position().map(|pos| pos.byte());
                let parsed = ParseError::from(err);
                Some(Err(match byte {
                    Some(byte) => parsed.at_record(self.line_at(byte) as usize),
                    None => parsed,
                }))
            }
        }
    }
}

impl<R: Read> StatementParser for CsvStatementParser<R> {
    type Record = StringRecord;
    type Records = CsvRecords;

    fn split_records(&mut self) -> Result<Self::Records, ParseError> {
        let delimiter = self.config.delimiter;
        if !delimiter.is_ascii() {
            return Err(ParseErrorKind::InvalidDelimiter(delimiter).into());
        }

        let mut reader = self
            .reader
            .take()
            .ok_or(ParseError::new(ParseErrorKind::MissingInput))?;

        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|err| ParseErrorKind::Csv(err.to_string()))?;

        let reader = ReaderBuilder::new()
            .has_headers(self.config.has_headers)
            .delimiter(delimiter as u8)
            .flexible(true)
            .from_reader(Cursor::new(content));

        Ok(CsvRecords::new(reader))
    }

    fn parse_record(&self, record: &StringRecord) -> Result<Option<TransactionLine>, ParseError> {
        let mut line = TransactionLine::default();

        for (field, column) in self.config.mappings.iter() {
            let raw = record.get(column).ok_or(ParseErrorKind::MissingColumn {
                column,
                len: record.len(),
            })?;
            let value = coerce(field, raw, &self.config.date_format)?;
            line.set(field, value)?;
        }

        if !self.config.mappings.contains(LineField::Id) {
            line.id = self.config.id_strategy.generate(&line);
        }

        Ok(Some(line))
    }

    fn start_statement(&self) -> Statement {
        Statement {
            currency: self.config.currency.clone(),
            bank_id: self.config.bank_id.clone(),
            account_id: self.config.account_id.clone(),
            ..Statement::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const SAMPLE_CSV: &str = "2025-12-26,DEBIT,Coffee Shop,-50.00,202512260,Morning coffee
2025-12-25,CREDIT,\"ACME Corp, Payroll\",1500.00,202512250,Salary deposit
";

    fn full_mapping() -> FieldMapping {
        FieldMapping::new([
            ("date_posted", 0),
            ("trn_type", 1),
            ("payee", 2),
            ("amount", 3),
            ("id", 4),
            ("memo", 5),
        ])
        .unwrap()
    }

    fn date_amount() -> FieldMapping {
        FieldMapping::new([("date_posted", 0), ("amount", 1)]).unwrap()
    }

    #[test]
    fn test_parse_valid_csv() {
        let mut parser = CsvStatementParser::new(SAMPLE_CSV.as_bytes(), full_mapping());
        let stmt = parser.parse().unwrap();

        assert_eq!(stmt.lines.len(), 2);
        let first = &stmt.lines[0];
        assert_eq!(first.trn_type, TransactionType::Debit);
        assert_eq!(first.amount, Some(Decimal::from_str("-50.00").unwrap()));
        assert_eq!(first.id.as_deref(), Some("202512260"));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 12, 26));

        // quoted field with embedded delimiter
        assert_eq!(stmt.lines[1].payee.as_deref(), Some("ACME Corp, Payroll"));
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let csv = "2024-01-03,1\n2024-01-01,2\n2024-01-02,3\n";
        let stmt = CsvStatementParser::new(csv.as_bytes(), date_amount())
            .parse()
            .unwrap();
        let days: Vec<_> = stmt.lines.iter().map(|l| l.date.unwrap()).collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_generates_missing_ids() {
        let csv = "2024-01-02,100.00\n2024-01-03,-25.50\n";
        let stmt = CsvStatementParser::new(csv.as_bytes(), date_amount())
            .parse()
            .unwrap();
        assert!(stmt.lines.iter().all(|l| l.id.is_some()));
        assert_ne!(stmt.lines[0].id, stmt.lines[1].id);
    }

    #[test]
    fn test_parse_without_ids_fails_validation() {
        let csv = "2024-01-02,100.00\n";
        let err = CsvStatementParser::new(csv.as_bytes(), date_amount())
            .id_strategy(IdStrategy::Disabled)
            .parse()
            .unwrap_err();
        assert_eq!(err.record, Some(1));
        assert!(matches!(err.kind, ParseErrorKind::Invalid(_)));
    }

    #[rstest]
    #[case("2024-01-02,1\n2024-01-03\n", 2, ParseErrorKind::MissingColumn { column: 1, len: 1 })]
    #[case("2024-01-02,abc\n", 1, ParseErrorKind::InvalidAmount("abc".into()))]
    #[case(
        "2024-01-02,1\n2024-01-03,2\n03/01/2024,3\n",
        3,
        ParseErrorKind::InvalidDate { value: "03/01/2024".into(), format: "%Y-%m-%d".into() }
    )]
    fn test_parse_error_reports_record(
        #[case] csv: &str,
        #[case] record: usize,
        #[case] kind: ParseErrorKind,
    ) {
        let err = CsvStatementParser::new(csv.as_bytes(), date_amount())
            .parse()
            .unwrap_err();
        assert_eq!(err, ParseError { record: Some(record), kind });
    }

    #[test]
    fn test_parse_zero_amount_is_invalid() {
        let err = CsvStatementParser::new("2024-01-02,0.00\n".as_bytes(), date_amount())
            .parse()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Invalid(crate::errors::ValidationError::ZeroAmount));
    }

    #[test]
    fn test_parse_with_headers_and_custom_format() {
        let csv = "Date;Amount\n02/01/2024;100,00\n";
        let err = CsvStatementParser::new(csv.as_bytes(), date_amount())
            .has_headers(true)
            .delimiter(';')
            .date_format("%d/%m/%Y")
            .parse()
            .unwrap_err();
        // decimal comma is not a number
        assert_eq!(err.kind, ParseErrorKind::InvalidAmount("100,00".into()));

        let csv = "Date;Amount\n02/01/2024;100.00\n";
        let stmt = CsvStatementParser::new(csv.as_bytes(), date_amount())
            .has_headers(true)
            .delimiter(';')
            .date_format("%d/%m/%Y")
            .parse()
            .unwrap();
        assert_eq!(stmt.lines.len(), 1);
        assert_eq!(stmt.lines[0].date, NaiveDate::from_ymd_opt(2024, 1, 2));
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let csv = "2024-01-02,1\n\n2024-01-03,2\n";
        let stmt = CsvStatementParser::new(csv.as_bytes(), date_amount())
            .parse()
            .unwrap();
        assert_eq!(stmt.lines.len(), 2);
    }

    #[rstest]
    #[case("2024-01-02,1\n\n2024-01-03,abc\n", false, 3)]
    #[case("2024-01-02,1\n\n\n\n2024-01-03,abc\n", false, 5)]
    #[case("Date,Amount\n2024-01-02,abc\n", true, 2)]
    #[case("Date,Amount\n\n2024-01-02,1\n2024-01-03,abc\n", true, 4)]
    fn test_parse_error_reports_input_line(
        #[case] csv: &str,
        #[case] has_headers: bool,
        #[case] line: usize,
    ) {
        let err = CsvStatementParser::new(csv.as_bytes(), date_amount())
            .has_headers(has_headers)
            .parse()
            .unwrap_err();
        assert_eq!(err.record, Some(line));
        assert_eq!(err.kind, ParseErrorKind::InvalidAmount("abc".into()));
    }

    #[rstest]
    #[case('€')]
    #[case('é')]
    fn test_parse_rejects_non_ascii_delimiter(#[case] delimiter: char) {
        let input = format!("2024-01-02{delimiter}1\n");
        let mut parser = CsvStatementParser::new(input.as_bytes(), date_amount()).delimiter(delimiter);
        assert_eq!(
            parser.parse().unwrap_err(),
            ParseError::new(ParseErrorKind::InvalidDelimiter(delimiter))
        );
        // input is left unread
        assert!(parser.reader.is_some());
    }

    #[test]
    fn test_statement_carries_account() {
        let stmt = CsvStatementParser::new("2024-01-02,1\n".as_bytes(), date_amount())
            .account("37040044", "532013000", "EUR")
            .parse()
            .unwrap();
        assert_eq!(stmt.bank_id.as_deref(), Some("37040044"));
        assert_eq!(stmt.account_id.as_deref(), Some("532013000"));
        assert_eq!(stmt.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_parse_twice_reports_missing_input() {
        let mut parser = CsvStatementParser::new("2024-01-02,1\n".as_bytes(), date_amount());
        assert!(parser.parse().is_ok());
        assert_eq!(
            parser.parse().unwrap_err().kind,
            ParseErrorKind::MissingInput
        );
    }

    #[test]
    fn test_parse_leaves_reader_usable() {
        let mut cursor = std::io::Cursor::new(b"2024-01-02,1\n".to_vec());
        {
            let mut parser = CsvStatementParser::new(&mut cursor, date_amount());
            parser.parse().unwrap();
        }
        assert_eq!(cursor.position(), 13);
    }
}
