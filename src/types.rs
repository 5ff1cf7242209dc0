use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// OFX `TRNTYPE` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Generic credit
    Credit,
    /// Generic debit
    Debit,
    /// Interest earned or paid
    Int,
    Div,
    /// FI fee
    Fee,
    /// Service charge
    SrvChg,
    /// Deposit
    Dep,
    Atm,
    /// Point of sale debit or credit
    Pos,
    /// Transfer
    Xfer,
    #[default]
    Check,
    /// Electronic payment
    Payment,
    /// Cash withdrawal
    Cash,
    DirectDep,
    /// Merchant initiated debit
    DirectDebit,
    /// Repeating payment/standing order
    RepeatPmt,
    Other,
}

impl TransactionType {
    pub const ALL: [TransactionType; 17] = [
        Self::Credit,
        Self::Debit,
        Self::Int,
        Self::Div,
        Self::Fee,
        Self::SrvChg,
        Self::Dep,
        Self::Atm,
        Self::Pos,
        Self::Xfer,
        Self::Check,
        Self::Payment,
        Self::Cash,
        Self::DirectDep,
        Self::DirectDebit,
        Self::RepeatPmt,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
            Self::Int => "INT",
            Self::Div => "DIV",
            Self::Fee => "FEE",
            Self::SrvChg => "SRVCHG",
            Self::Dep => "DEP",
            Self::Atm => "ATM",
            Self::Pos => "POS",
            Self::Xfer => "XFER",
            Self::Check => "CHECK",
            Self::Payment => "PAYMENT",
            Self::Cash => "CASH",
            Self::DirectDep => "DIRECTDEP",
            Self::DirectDebit => "DIRECTDEBIT",
            Self::RepeatPmt => "REPEATPMT",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// OFX `ACCTTYPE` values for bank accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    /// Money market
    MoneyMrkt,
    /// Line of credit
    CreditLine,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
            Self::MoneyMrkt => "MONEYMRKT",
            Self::CreditLine => "CREDITLINE",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CHECKING" => Ok(Self::Checking),
            "SAVINGS" => Ok(Self::Savings),
            "MONEYMRKT" => Ok(Self::MoneyMrkt),
            "CREDITLINE" => Ok(Self::CreditLine),
            _ => Err(s.to_string()),
        }
    }
}
