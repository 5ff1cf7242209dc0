use std::fs;

use crate::{
    errors::{StatementError, StatementResult},
    ofx::OfxWriter,
    parsers::prelude::*,
    statement::Statement,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
}

impl FileFormat {
    fn detect(filename: Option<&str>) -> Result<Self, StatementError> {
        match filename.and_then(|name| name.rsplit_once('.')) {
            Some((_, ext)) if ext.eq_ignore_ascii_case("csv") => Ok(FileFormat::Csv),
            _ => Err(StatementError::UnsupportedFormat),
        }
    }
}

/// Parse a statement from content or a file, then validate it and serialize
/// it to OFX.
///
/// ```rust,ignore
/// let ofx = ParserBuilder::new()
///     .filename("statement.csv")
///     .config(config)
///     .to_ofx("mytool", "1.0")?;
/// ```
#[derive(Default)]
pub struct ParserBuilder {
    content: Option<String>,
    filepath: Option<String>,
    format: Option<FileFormat>,
    config: Option<CsvConfig>,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filepath = Some(filename.to_string());
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn config(mut self, config: CsvConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Parse every record. The statement is not validated as a whole yet;
    /// see [`ParserBuilder::parse_valid`].
    pub fn parse(self) -> StatementResult<Statement> {
        // Content without a filename has nothing to detect from; CSV is the
        // only reader we have.
        let format = match (self.format, &self.content, &self.filepath) {
            (Some(format), _, _) => format,
            (None, Some(_), None) => FileFormat::Csv,
            (None, _, filepath) => FileFormat::detect(filepath.as_deref())?,
        };

        let config = self
            .config
            .ok_or(StatementError::MissingConfig)?;

        let content = self
            .content
            .map(Ok)
            .unwrap_or_else(|| {
                self.filepath
                    .ok_or(StatementError::MissingContentAndFilepath)
                    .and_then(|path| fs::read_to_string(path).map_err(Into::into))
            })?;

        match format {
            FileFormat::Csv => {
                let statement =
                    CsvStatementParser::from_config(content.as_bytes(), config).parse()?;
                Ok(statement)
            }
        }
    }

    /// Parse, reconcile balances when the source carries none, and validate.
    pub fn parse_valid(self) -> StatementResult<Statement> {
        let mut statement = self.parse()?;
        if statement.end_balance.is_none() && !statement.lines.is_empty() {
            crate::balance::recalculate_balance(&mut statement)?;
        }
        statement.assert_valid()?;
        Ok(statement)
    }

    pub fn to_ofx(self, app_name: &str, app_version: &str) -> StatementResult<String> {
        let statement = self.parse_valid()?;
        let ofx = OfxWriter::new(&statement).app(app_name, app_version).to_ofx()?;
        Ok(ofx)
    }
}

/// Parse with any record parser, validate the statement, and serialize it.
///
/// The statement must already carry its balances; use
/// [`recalculate_balance`](crate::balance::recalculate_balance) in the parser
/// when the source has none.
pub fn convert<P: StatementParser>(
    parser: &mut P,
    app_name: &str,
    app_version: &str,
) -> StatementResult<String> {
    let statement = parser.parse()?;
    statement.assert_valid()?;
    let ofx = OfxWriter::new(&statement).app(app_name, app_version).to_ofx()?;
    Ok(ofx)
}
