//! Statement model: the normalized form every parser produces and the OFX
//! writer consumes.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::iban::IbanParts;
use crate::types::{AccountType, TransactionType};

const MAX_BANK_ID: usize = 9;
const MAX_ACCT_ID: usize = 22;
const MAX_BRANCH_ID: usize = 22;
const MAX_ACCT_KEY: usize = 22;
const MAX_FITID: usize = 255;
const MAX_PAYEE: usize = 32;
const MAX_CHECK_NO: usize = 12;
const MAX_REFNUM: usize = 32;

fn require<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::Missing { field })
}

fn check_len(field: &'static str, value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field,
            value: v.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Account aggregate of OFX `BANKACCTFROM`/`BANKACCTTO`.
///
/// Identifies an account at a financial institution well enough for
/// statement purposes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankAccount {
    /// Routing and transit number
    pub bank_id: String,
    /// Bank identifier for international banks
    pub branch_id: Option<String>,
    /// Account number
    pub acct_id: String,
    pub acct_type: AccountType,
    /// Checksum for international banks
    pub acct_key: Option<String>,
}

impl BankAccount {
    pub fn new(bank_id: impl Into<String>, acct_id: impl Into<String>) -> Self {
        Self {
            bank_id: bank_id.into(),
            acct_id: acct_id.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, acct_type: AccountType) -> Self {
        self.acct_type = acct_type;
        self
    }

    pub fn with_branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }

    pub fn with_key(mut self, acct_key: impl Into<String>) -> Self {
        self.acct_key = Some(acct_key.into());
        self
    }

    /// Build an account from a decomposed IBAN. `None` when the IBAN could
    /// not be split (unknown country or malformed input).
    pub fn from_iban_parts(parts: IbanParts) -> Option<Self> {
        if parts.is_empty() {
            return None;
        }
        Some(Self {
            bank_id: parts.bank_id.unwrap_or_default(),
            branch_id: parts.branch_id,
            acct_id: parts.acct_id.unwrap_or_default(),
            acct_type: AccountType::default(),
            acct_key: parts.acct_key,
        })
    }

    pub fn assert_valid(&self) -> Result<(), ValidationError> {
        let bank_id = require("bank_id", Some(self.bank_id.as_str()))?;
        check_len("bank_id", Some(bank_id), MAX_BANK_ID)?;

        let acct_id = require("acct_id", Some(self.acct_id.as_str()))?;
        check_len("acct_id", Some(acct_id), MAX_ACCT_ID)?;

        check_len("acct_key", self.acct_key.as_deref(), MAX_ACCT_KEY)?;
        check_len("branch_id", self.branch_id.as_deref(), MAX_BRANCH_ID)?;
        Ok(())
    }
}

/// Fields a record parser may set on a [`TransactionLine`].
///
/// This is the complete list; anything else in a mapping is rejected when the
/// mapping is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineField {
    Id,
    DatePosted,
    DateUser,
    DateAvail,
    Amount,
    Payee,
    Memo,
    CheckNo,
    Refnum,
    TrnType,
    Currency,
}

/// How raw text for a [`LineField`] is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Date,
    Amount,
    TransactionType,
    Text,
}

impl LineField {
    pub const ALL: [LineField; 11] = [
        Self::Id,
        Self::DatePosted,
        Self::DateUser,
        Self::DateAvail,
        Self::Amount,
        Self::Payee,
        Self::Memo,
        Self::CheckNo,
        Self::Refnum,
        Self::TrnType,
        Self::Currency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::DatePosted => "date_posted",
            Self::DateUser => "date_user",
            Self::DateAvail => "date_avail",
            Self::Amount => "amount",
            Self::Payee => "payee",
            Self::Memo => "memo",
            Self::CheckNo => "check_no",
            Self::Refnum => "refnum",
            Self::TrnType => "trn_type",
            Self::Currency => "currency",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::DatePosted | Self::DateUser | Self::DateAvail => FieldKind::Date,
            Self::Amount => FieldKind::Amount,
            Self::TrnType => FieldKind::TransactionType,
            Self::Id
            | Self::Payee
            | Self::Memo
            | Self::CheckNo
            | Self::Refnum
            | Self::Currency => FieldKind::Text,
        }
    }
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coerced value ready to be stored on a line
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Date(NaiveDate),
    Amount(Decimal),
    TransactionType(TransactionType),
    Text(String),
}

/// One transaction of a statement (OFX `STMTTRN`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionLine {
    /// Financial institution transaction id (`FITID`)
    pub id: Option<String>,
    /// Date transaction was posted to account
    pub date: Option<NaiveDate>,
    /// Date user initiated transaction, if known
    pub date_user: Option<NaiveDate>,
    /// Date funds are available (value date)
    pub date_avail: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub payee: Option<String>,
    pub memo: Option<String>,
    pub check_no: Option<String>,
    /// Reference number that uniquely identifies the transaction; may be used
    /// in addition to or instead of `check_no`
    pub refnum: Option<String>,
    pub trn_type: TransactionType,
    /// Alternative currency for this line only
    pub currency: Option<String>,
    /// Counterparty account
    pub bank_account_to: Option<BankAccount>,
}

impl TransactionLine {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        memo: Option<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Some(id.into()),
            date: Some(date),
            memo,
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Store a coerced value. The value must have the variant
    /// [`LineField::kind`] declares; the line is left untouched otherwise.
    pub fn set(&mut self, field: LineField, value: FieldValue) -> Result<(), ValidationError> {
        match (field, value) {
            (LineField::DatePosted, FieldValue::Date(d)) => self.date = Some(d),
            (LineField::DateUser, FieldValue::Date(d)) => self.date_user = Some(d),
            (LineField::DateAvail, FieldValue::Date(d)) => self.date_avail = Some(d),
            (LineField::Amount, FieldValue::Amount(a)) => self.amount = Some(a),
            (LineField::TrnType, FieldValue::TransactionType(t)) => self.trn_type = t,
            (LineField::Id, FieldValue::Text(s)) => self.id = Some(s),
            (LineField::Payee, FieldValue::Text(s)) => self.payee = Some(s),
            (LineField::Memo, FieldValue::Text(s)) => self.memo = Some(s),
            (LineField::CheckNo, FieldValue::Text(s)) => self.check_no = Some(s),
            (LineField::Refnum, FieldValue::Text(s)) => self.refnum = Some(s),
            (LineField::Currency, FieldValue::Text(s)) => self.currency = Some(s),
            (field, _) => return Err(ValidationError::KindMismatch { field: field.name() }),
        }
        Ok(())
    }

    pub fn assert_valid(&self) -> Result<(), ValidationError> {
        if self.date.is_none() {
            return Err(ValidationError::Missing { field: "date" });
        }
        match self.amount {
            None => return Err(ValidationError::Missing { field: "amount" }),
            Some(a) if a.is_zero() => return Err(ValidationError::ZeroAmount),
            Some(_) => {}
        }

        let id = require("id", self.id.as_deref())?;
        check_len("id", Some(id), MAX_FITID)?;

        if let Some(account) = &self.bank_account_to {
            account.assert_valid()?;
        }

        check_len("payee", self.payee.as_deref(), MAX_PAYEE)?;
        check_len("check_no", self.check_no.as_deref(), MAX_CHECK_NO)?;
        check_len("refnum", self.refnum.as_deref(), MAX_REFNUM)?;

        if let Some(currency) = self.currency.as_deref().filter(|c| !c.is_empty()) {
            if currency.chars().count() != 3 {
                return Err(ValidationError::InvalidCurrency(currency.to_string()));
            }
        }
        Ok(())
    }
}

fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for TransactionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ID: {}, date: {}, amount: {}, payee: {}",
            display_opt(&self.id),
            display_opt(&self.date),
            display_opt(&self.amount),
            display_opt(&self.payee),
        )?;
        writeln!(f, "memo: {}", display_opt(&self.memo))?;
        write!(f, "check no.: {}", display_opt(&self.check_no))
    }
}

/// A bank statement: account identity, balances, and ordered lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement {
    pub currency: Option<String>,
    pub bank_id: Option<String>,
    pub account_id: Option<String>,

    pub start_balance: Option<Decimal>,
    pub start_date: Option<NaiveDate>,

    pub end_balance: Option<Decimal>,
    pub end_date: Option<NaiveDate>,

    /// Document order, not necessarily chronological
    pub lines: Vec<TransactionLine>,
}

impl Statement {
    pub fn new(
        bank_id: impl Into<String>,
        account_id: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            bank_id: Some(bank_id.into()),
            account_id: Some(account_id.into()),
            currency: Some(currency.into()),
            ..Self::default()
        }
    }

    pub fn assert_valid(&self) -> Result<(), ValidationError> {
        require("currency", self.currency.as_deref())?;

        let bank_id = require("bank_id", self.bank_id.as_deref())?;
        check_len("bank_id", Some(bank_id), MAX_BANK_ID)?;

        let account_id = require("account_id", self.account_id.as_deref())?;
        check_len("account_id", Some(account_id), MAX_ACCT_ID)?;

        if self.start_date.is_none() {
            return Err(ValidationError::Missing { field: "start_date" });
        }
        if self.end_date.is_none() {
            return Err(ValidationError::Missing { field: "end_date" });
        }
        if self.end_balance.is_none() {
            return Err(ValidationError::Missing { field: "end_balance" });
        }
        Ok(())
    }
}
