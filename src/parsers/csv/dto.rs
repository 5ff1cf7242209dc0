use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::DEFAULT_DATE_FORMAT;
use crate::errors::StatementError;
use crate::fitid::IdStrategy;
use crate::statement::LineField;

/// 0-based CSV column for each transaction line field.
///
/// Deserializes from an object such as `{"date_posted": 0, "amount": 1}`;
/// unknown field names are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, usize>", into = "BTreeMap<String, usize>")]
pub struct FieldMapping(BTreeMap<LineField, usize>);

impl FieldMapping {
    pub fn new<'a, I>(pairs: I) -> Result<Self, StatementError>
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        pairs
            .into_iter()
            .map(|(name, column)| {
                LineField::from_name(name)
                    .map(|field| (field, column))
                    .ok_or_else(|| StatementError::UnknownField(name.to_string()))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }

    pub fn with(mut self, field: LineField, column: usize) -> Self {
        self.0.insert(field, column);
        self
    }

    pub fn column(&self, field: LineField) -> Option<usize> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: LineField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineField, usize)> + '_ {
        self.0.iter().map(|(f, c)| (*f, *c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<String, usize>> for FieldMapping {
    type Error = StatementError;

    fn try_from(map: BTreeMap<String, usize>) -> Result<Self, Self::Error> {
        Self::new(map.iter().map(|(name, column)| (name.as_str(), *column)))
    }
}

impl From<FieldMapping> for BTreeMap<String, usize> {
    fn from(mapping: FieldMapping) -> Self {
        mapping
            .iter()
            .map(|(field, column)| (field.name().to_string(), column))
            .collect()
    }
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_delimiter() -> char {
    ','
}

/// Settings of a CSV statement parser, loadable from JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvConfig {
    pub mappings: FieldMapping,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Skip the first row
    #[serde(default)]
    pub has_headers: bool,
    #[serde(default)]
    pub id_strategy: IdStrategy,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub bank_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

impl CsvConfig {
    pub fn new(mappings: FieldMapping) -> Self {
        Self {
            mappings,
            date_format: default_date_format(),
            delimiter: default_delimiter(),
            has_headers: false,
            id_strategy: IdStrategy::default(),
            currency: None,
            bank_id: None,
            account_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_mapping_from_pairs() {
        let mapping = FieldMapping::new([("date_posted", 0), ("amount", 1)]).unwrap();
        assert_eq!(mapping.column(LineField::DatePosted), Some(0));
        assert_eq!(mapping.column(LineField::Amount), Some(1));
        assert_eq!(mapping.column(LineField::Memo), None);
        assert_eq!(mapping.len(), 2);
    }

    #[rstest]
    #[case("balance")]
    #[case("Date")]
    #[case("")]
    fn test_mapping_rejects_unknown_field(#[case] name: &str) {
        let result = FieldMapping::new([("amount", 1), (name, 0)]);
        assert!(matches!(result, Err(StatementError::UnknownField(n)) if n == name));
    }

    #[test]
    fn test_mapping_deserialize() {
        let mapping: FieldMapping =
            serde_json::from_str(r#"{"date_posted": 0, "memo": 2, "amount": 3}"#).unwrap();
        assert_eq!(mapping.column(LineField::Memo), Some(2));

        let err = serde_json::from_str::<FieldMapping>(r#"{"colour": 1}"#).unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_mapping_serialize_uses_field_names() {
        let mapping = FieldMapping::default().with(LineField::TrnType, 4);
        assert_eq!(serde_json::to_string(&mapping).unwrap(), r#"{"trn_type":4}"#);
    }

    #[test]
    fn test_config_defaults() {
        let config: CsvConfig =
            serde_json::from_str(r#"{"mappings": {"date_posted": 0, "amount": 1}}"#).unwrap();
        assert_eq!(config.date_format, "%Y-%m-%d");
        assert_eq!(config.delimiter, ',');
        assert!(!config.has_headers);
        assert_eq!(config.id_strategy, IdStrategy::Stable);
        assert_eq!(config.currency, None);
    }

    #[test]
    fn test_config_full() {
        let config: CsvConfig = serde_json::from_str(
            r#"{
                "mappings": {"date_posted": 1, "amount": 2, "id": 0},
                "date_format": "%d/%m/%Y",
                "delimiter": ";",
                "has_headers": true,
                "id_strategy": "disabled",
                "currency": "EUR",
                "bank_id": "37040044",
                "account_id": "532013000"
            }"#,
        )
        .unwrap();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.id_strategy, IdStrategy::Disabled);
        assert_eq!(config.mappings.column(LineField::Id), Some(0));
        assert_eq!(config.bank_id.as_deref(), Some("37040044"));
    }
}
