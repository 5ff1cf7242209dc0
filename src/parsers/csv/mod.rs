pub mod dto;
pub mod parser;
pub mod types;

pub mod prelude {
    pub use super::dto::{CsvConfig, FieldMapping};
    pub use super::parser::CsvStatementParser;
    pub use super::types::{CsvDate, DEFAULT_DATE_FORMAT};
}
