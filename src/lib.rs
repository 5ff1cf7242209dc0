//! Convert bank transaction exports into OFX statements.
//!
//! ```rust,ignore
//! use ofx_statement_rs::{CsvStatementParser, FieldMapping, OfxWriter, StatementParser};
//!
//! let mapping = FieldMapping::new([("date_posted", 0), ("amount", 1)])?;
//! let mut statement = CsvStatementParser::new(&mut file, mapping)
//!     .account("37040044", "532013000", "EUR")
//!     .parse()?;
//! recalculate_balance(&mut statement)?;
//! statement.assert_valid()?;
//! let ofx = OfxWriter::new(&statement).to_ofx()?;
//! ```

mod builder;

pub mod balance;
pub mod errors;
pub mod fitid;
pub mod iban;
pub mod ofx;
pub mod parsers;
pub mod statement;
pub mod types;

pub use balance::{check_balance, recalculate_balance};
pub use builder::{FileFormat, ParserBuilder, convert};
pub use fitid::{IdStrategy, generate_stable_transaction_id, generate_transaction_id};
pub use iban::{IbanParts, parse_iban};
pub use ofx::OfxWriter;
pub use parsers::prelude::*;
pub use statement::{BankAccount, FieldKind, FieldValue, LineField, Statement, TransactionLine};
pub use types::{AccountType, TransactionType};
