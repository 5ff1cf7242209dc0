use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

/// OFX date, rendered `YYYYMMDD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfxDate(pub NaiveDate);

/// OFX timestamp, rendered `YYYYMMDDHHMMSS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfxDateTime(pub NaiveDateTime);

/// OFX amount: fixed point, exactly two fraction digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfxAmount(pub Decimal);

impl fmt::Display for OfxDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl fmt::Display for OfxDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d%H%M%S"))
    }
}

impl From<NaiveDate> for OfxDateTime {
    fn from(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl fmt::Display for OfxAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{rounded:.2}")
    }
}
