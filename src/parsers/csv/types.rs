use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::ParseErrorKind;
use crate::statement::{FieldKind, FieldValue, LineField};
use crate::types::TransactionType;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw date text taken from a CSV column.
///
/// The format is configured per parser (chrono `strftime` syntax), default
/// `%Y-%m-%d`.
#[derive(Debug, Clone)]
pub struct CsvDate(String);

impl CsvDate {
    pub fn parse(&self, format: &str) -> Result<NaiveDate, ParseErrorKind> {
        NaiveDate::parse_from_str(self.0.trim(), format).map_err(|_| ParseErrorKind::InvalidDate {
            value: self.0.clone(),
            format: format.to_string(),
        })
    }
}

impl From<String> for CsvDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CsvDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Coerce column text into the value type `field` declares.
pub fn coerce(field: LineField, raw: &str, date_format: &str) -> Result<FieldValue, ParseErrorKind> {
    match field.kind() {
        FieldKind::Date => CsvDate::from(raw).parse(date_format).map(FieldValue::Date),
        FieldKind::Amount => Decimal::from_str(raw.trim())
            .or_else(|_| Decimal::from_scientific(raw.trim()))
            .map(FieldValue::Amount)
            .map_err(|_| ParseErrorKind::InvalidAmount(raw.to_string())),
        FieldKind::TransactionType => TransactionType::from_str(raw)
            .map(FieldValue::TransactionType)
            .map_err(ParseErrorKind::InvalidTransactionType),
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
    }
}

// -----------------------------------------------------------------------------
// Testes
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rstest::rstest;

    #[rstest]
    #[case("2025-12-26", "%Y-%m-%d", 2025, 12, 26)]
    #[case("26/12/2025", "%d/%m/%Y", 2025, 12, 26)]
    #[case("12/26/2025", "%m/%d/%Y", 2025, 12, 26)]
    #[case("  2025-01-01  ", "%Y-%m-%d", 2025, 1, 1)]
    #[case("31.12.2025", "%d.%m.%Y", 2025, 12, 31)]
    fn test_csv_date_valid_formats(
        #[case] input: &str,
        #[case] format: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
    ) {
        let date = CsvDate::from(input).parse(format).unwrap();
        assert_eq!(date.year(), year);
        assert_eq!(date.month(), month);
        assert_eq!(date.day(), day);
    }

    #[rstest]
    #[case("2025-13-01")]     // mês inválido
    #[case("2025-02-30")]     // fevereiro inválido
    #[case("26/12/2025")]     // formato diferente
    #[case("invalid-date")]
    #[case("")]
    #[case("   ")]
    fn test_csv_date_invalid_formats(#[case] input: &str) {
        let result = CsvDate::from(input).parse(DEFAULT_DATE_FORMAT);
        assert_eq!(
            result,
            Err(ParseErrorKind::InvalidDate {
                value: input.to_string(),
                format: DEFAULT_DATE_FORMAT.to_string(),
            })
        );
    }

    #[rstest]
    #[case("100.00", "100.00")]
    #[case("-25.50", "-25.50")]
    #[case(" 7 ", "7")]
    #[case("1e3", "1000")]
    fn test_coerce_amount(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(
            coerce(LineField::Amount, raw, DEFAULT_DATE_FORMAT),
            Ok(FieldValue::Amount(Decimal::from_str(expected).unwrap()))
        );
    }

    #[rstest]
    #[case("abc")]
    #[case("$100.00")]
    #[case("1,000.00")]
    #[case("")]
    fn test_coerce_amount_invalid(#[case] raw: &str) {
        assert_eq!(
            coerce(LineField::Amount, raw, DEFAULT_DATE_FORMAT),
            Err(ParseErrorKind::InvalidAmount(raw.to_string()))
        );
    }

    #[test]
    fn test_coerce_text_is_unchanged() {
        assert_eq!(
            coerce(LineField::Memo, "  spaced  ", DEFAULT_DATE_FORMAT),
            Ok(FieldValue::Text("  spaced  ".to_string()))
        );
    }

    #[test]
    fn test_coerce_transaction_type() {
        assert_eq!(
            coerce(LineField::TrnType, "xfer", DEFAULT_DATE_FORMAT),
            Ok(FieldValue::TransactionType(TransactionType::Xfer))
        );
        assert_eq!(
            coerce(LineField::TrnType, "WIRE", DEFAULT_DATE_FORMAT),
            Err(ParseErrorKind::InvalidTransactionType("WIRE".to_string()))
        );
    }

    #[test]
    fn test_coerce_date_uses_format() {
        assert_eq!(
            coerce(LineField::DateUser, "02/01/2024", "%d/%m/%Y"),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()))
        );
    }
}
