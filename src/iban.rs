//! Positional IBAN decomposition.

use std::sync::LazyLock;

use regex::Regex;

static IBAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{1,30}$").expect("valid IBAN regex")
});

#[derive(Debug, Clone, Copy)]
enum Part {
    BankId,
    BranchId,
    AcctId,
    AcctKey,
}

type Layout = &'static [(Part, usize, usize)];

/// Half-open character ranges into the full IBAN, per country
fn layout(country: &str) -> Option<Layout> {
    use Part::*;
    let layout: Layout = match country {
        "AT" => &[(BankId, 4, 9), (AcctId, 9, 20)],
        "BE" => &[(BankId, 4, 7), (AcctId, 7, 14), (AcctKey, 14, 16)],
        "CH" => &[(BankId, 4, 9), (AcctId, 9, 21)],
        "DE" => &[(BankId, 4, 12), (AcctId, 12, 22)],
        "DK" => &[(BankId, 4, 8), (AcctId, 8, 17), (AcctKey, 17, 18)],
        "FR" => &[
            (BankId, 4, 9),
            (BranchId, 9, 14),
            (AcctId, 14, 25),
            (AcctKey, 25, 27),
        ],
        "GB" => &[(BankId, 4, 8), (BranchId, 8, 14), (AcctId, 14, 22)],
        "IT" => &[
            (AcctKey, 4, 5),
            (BankId, 5, 10),
            (BranchId, 10, 15),
            (AcctId, 15, 27),
        ],
        _ => return None,
    };
    Some(layout)
}

/// Account fields recovered from an IBAN.
///
/// Feed it to [`BankAccount::from_iban_parts`](crate::BankAccount::from_iban_parts).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IbanParts {
    pub bank_id: Option<String>,
    pub branch_id: Option<String>,
    pub acct_id: Option<String>,
    pub acct_key: Option<String>,
}

impl IbanParts {
    pub fn is_empty(&self) -> bool {
        self.bank_id.is_none()
            && self.branch_id.is_none()
            && self.acct_id.is_none()
            && self.acct_key.is_none()
    }

    fn slot(&mut self, part: Part) -> &mut Option<String> {
        match part {
            Part::BankId => &mut self.bank_id,
            Part::BranchId => &mut self.branch_id,
            Part::AcctId => &mut self.acct_id,
            Part::AcctKey => &mut self.acct_key,
        }
    }
}

/// Split an IBAN into bank, branch, account and key parts.
///
/// Spaces are removed first. Input that does not look like an IBAN, or whose
/// country has no known layout, gives an empty result rather than an error.
/// Leading zeros are stripped from every part.
pub fn parse_iban(iban: &str) -> IbanParts {
    let iban: String = iban.chars().filter(|c| *c != ' ').collect();
    let mut parts = IbanParts::default();

    if !IBAN_PATTERN.is_match(&iban) {
        log::debug!("'{iban}' is not an IBAN");
        return parts;
    }

    let Some(layout) = layout(&iban[..2]) else {
        log::warn!("no IBAN layout for country '{}'", &iban[..2]);
        return parts;
    };

    // the pattern guarantees ASCII, so byte offsets are character offsets
    for &(part, start, end) in layout {
        let start = start.min(iban.len());
        let end = end.min(iban.len());
        *parts.slot(part) = Some(iban[start..end].trim_start_matches('0').to_string());
    }
    parts
}
