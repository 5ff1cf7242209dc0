use thiserror::Error;

/// Invariant violated by a `BankAccount`, `TransactionLine` or `Statement`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is absent or empty
    #[error("{field} missing")]
    Missing { field: &'static str },

    /// Bounded field exceeds its OFX length limit
    #[error("{field} '{value}' too long (max {max} characters)")]
    TooLong {
        field: &'static str,
        value: String,
        max: usize,
    },

    #[error("transaction amount must not be zero")]
    ZeroAmount,

    /// Currency override must be a 3-letter code
    #[error("invalid currency '{0}'")]
    InvalidCurrency(String),

    /// Balance reconciliation needs at least one line
    #[error("statement has no transaction lines")]
    EmptyStatement,

    /// Balance arithmetic left the range of a decimal
    #[error("balance overflows the decimal range")]
    BalanceOverflow,

    /// Value does not have the type the field declares
    #[error("value for {field} has the wrong type")]
    KindMismatch { field: &'static str },
}

/// What went wrong while turning a raw record into a transaction line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("cannot find column {column} in record of {len} items")]
    MissingColumn { column: usize, len: usize },

    #[error("invalid date '{value}' (expected format '{format}')")]
    InvalidDate { value: String, format: String },

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("unknown transaction type '{0}'")]
    InvalidTransactionType(String),

    /// The underlying CSV reader failed (bad quoting, invalid UTF-8, I/O)
    #[error("CSV read error: {0}")]
    Csv(String),

    /// The csv reader splits on a single ASCII byte
    #[error("delimiter '{0}' is not a single ASCII character")]
    InvalidDelimiter(char),

    /// Records were already consumed by an earlier `parse` call
    #[error("input was already consumed")]
    MissingInput,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Malformed input, optionally pinned to the 1-based record where it happened
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{kind}", record_prefix(.record))]
pub struct ParseError {
    pub record: Option<usize>,
    pub kind: ParseErrorKind,
}

fn record_prefix(record: &Option<usize>) -> String {
    match record {
        Some(n) => format!("record {n}: "),
        None => String::new(),
    }
}

impl ParseError {
    pub fn new(kind: ParseErrorKind) -> Self {
        Self { record: None, kind }
    }

    /// Attach the record number unless a more specific one is already set
    pub fn at_record(mut self, record: usize) -> Self {
        self.record.get_or_insert(record);
        self
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ValidationError> for ParseError {
    fn from(err: ValidationError) -> Self {
        Self::new(ParseErrorKind::Invalid(err))
    }
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        Self::new(ParseErrorKind::Csv(err.to_string()))
    }
}

/// Failure while emitting the OFX document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// A mandatory OFX element had no value
    #[error("missing value for '{tag}'")]
    MissingValue { tag: &'static str },

    #[error("XML write error: {0}")]
    Xml(String),
}

/// Erros possíveis durante a conversão de extratos bancários
#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid statement: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    /// Field mapping names a field that a transaction line does not have
    #[error("Unknown statement line field '{0}'")]
    UnknownField(String),

    /// Formato do arquivo não é suportado pela biblioteca
    #[error("Unsupported file format")]
    UnsupportedFormat,

    /// Erro ao ler o conteúdo do arquivo do disco
    #[error("Failed to read file content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// O builder foi chamado sem fornecer conteúdo nem caminho de arquivo
    #[error("Content or filepath is required")]
    MissingContentAndFilepath,

    #[error("CSV parser configuration is required")]
    MissingConfig,
}

/// Alias conveniente para Result com nosso tipo de erro principal
pub type StatementResult<T> = Result<T, StatementError>;
