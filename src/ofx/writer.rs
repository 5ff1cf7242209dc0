use chrono::{Local, NaiveDate, NaiveDateTime};
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;

use super::types::{OfxAmount, OfxDate, OfxDateTime};
use crate::errors::SerializationError;
use crate::statement::{BankAccount, Statement, TransactionLine};
use crate::types::AccountType;

/// Verbatim OFX 1.x header block that precedes the XML aggregate
pub const OFX_HEADER: &str = "<!-- \n\
OFXHEADER:160\n\
DATA:OFXSGML\n\
VERSION:106\n\
SECURITY:NONE\n\
ENCODING:UTF-8\n\
CHARSET:NONE\n\
COMPRESSION:NONE\n\
OLDFILEUID:NONE\n\
NEWFILEUID:NONE\n\
-->\n\n";

pub const DEFAULT_APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const DEFAULT_APP_VERSION: &str = env!("CARGO_PKG_VERSION");

type WriteResult = Result<(), SerializationError>;

fn xml_err(err: impl std::fmt::Display) -> SerializationError {
    SerializationError::Xml(err.to_string())
}

/// Serializes a [`Statement`] into an OFX document.
///
/// ```rust,ignore
/// let ofx = OfxWriter::new(&statement).app("mytool", "1.0").to_ofx()?;
/// ```
pub struct OfxWriter<'a> {
    statement: &'a Statement,
    app_name: String,
    app_version: String,
    generated_at: NaiveDateTime,
}

impl<'a> OfxWriter<'a> {
    pub fn new(statement: &'a Statement) -> Self {
        Self {
            statement,
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            generated_at: Local::now().naive_local(),
        }
    }

    /// Name and version reported in the sign-on status message
    pub fn app(mut self, name: &str, version: &str) -> Self {
        self.app_name = name.to_string();
        self.app_version = version.to_string();
        self
    }

    /// Value of `DTSERVER`; defaults to the local time at construction
    pub fn generated_at(mut self, timestamp: NaiveDateTime) -> Self {
        self.generated_at = timestamp;
        self
    }

    /// Header block followed by the XML aggregate. Nothing is returned when a
    /// mandatory element is missing.
    pub fn to_ofx(&self) -> Result<String, SerializationError> {
        let mut doc = Document::new();
        self.build_document(&mut doc)?;
        let body = doc.finish()?;

        log::info!(
            "serialized statement {} with {} transactions",
            self.statement.account_id.as_deref().unwrap_or("?"),
            self.statement.lines.len()
        );
        Ok(format!("{OFX_HEADER}{body}"))
    }

    fn build_document(&self, doc: &mut Document) -> WriteResult {
        doc.start("OFX")?;
        self.build_signon(doc)?;
        self.build_transaction_list(doc)?;
        doc.end("OFX")
    }

    fn build_signon(&self, doc: &mut Document) -> WriteResult {
        doc.start("SIGNONMSGSRSV1")?;
        doc.start("SONRS")?;
        doc.start("STATUS")?;
        doc.mandatory("CODE", Some("0"))?;
        doc.mandatory("SEVERITY", Some("INFO"))?;
        let message = format!("Created by {} ({})", self.app_name, self.app_version);
        doc.optional("MESSAGE", Some(message.as_str()))?;
        doc.end("STATUS")?;

        doc.datetime("DTSERVER", Some(OfxDateTime(self.generated_at)))?;
        doc.mandatory("LANGUAGE", Some("ENG"))?;

        doc.end("SONRS")?;
        doc.end("SIGNONMSGSRSV1")
    }

    fn build_transaction_list(&self, doc: &mut Document) -> WriteResult {
        let stmt = self.statement;

        doc.start("BANKMSGSRSV1")?;
        doc.start("STMTTRNRS")?;

        doc.optional("TRNUID", Some("0"))?;
        doc.start("STATUS")?;
        doc.mandatory("CODE", Some("0"))?;
        doc.mandatory("SEVERITY", Some("INFO"))?;
        doc.end("STATUS")?;

        doc.start("STMTRS")?;
        doc.mandatory("CURDEF", stmt.currency.as_deref())?;
        doc.start("BANKACCTFROM")?;
        doc.mandatory("BANKID", stmt.bank_id.as_deref())?;
        doc.mandatory("ACCTID", stmt.account_id.as_deref())?;
        doc.mandatory("ACCTTYPE", Some(AccountType::Checking.as_str()))?;
        doc.end("BANKACCTFROM")?;

        doc.start("BANKTRANLIST")?;
        doc.date("DTSTART", stmt.start_date, true)?;
        doc.date("DTEND", stmt.end_date, true)?;
        for line in &stmt.lines {
            self.build_transaction(doc, line)?;
        }
        doc.end("BANKTRANLIST")?;

        doc.start("LEDGERBAL")?;
        doc.amount("BALAMT", stmt.end_balance, true)?;
        doc.datetime("DTASOF", stmt.end_date.map(OfxDateTime::from))?;
        doc.end("LEDGERBAL")?;

        doc.end("STMTRS")?;
        doc.end("STMTTRNRS")?;
        doc.end("BANKMSGSRSV1")
    }

    fn build_transaction(&self, doc: &mut Document, line: &TransactionLine) -> WriteResult {
        doc.start("STMTTRN")?;

        doc.mandatory("TRNTYPE", Some(line.trn_type.as_str()))?;
        doc.date("DTPOSTED", line.date, true)?;
        doc.date("DTUSER", line.date_user, false)?;
        doc.date("DTAVAIL", line.date_avail, false)?;
        doc.amount("TRNAMT", line.amount, true)?;
        doc.mandatory("FITID", line.id.as_deref())?;
        doc.optional("CHECKNUM", line.check_no.as_deref())?;
        doc.optional("NAME", line.payee.as_deref())?;
        doc.optional("MEMO", line.memo.as_deref())?;
        doc.optional("REFNUM", line.refnum.as_deref())?;
        doc.optional("CURRENCY", line.currency.as_deref())?;
        if let Some(account) = &line.bank_account_to {
            doc.start("BANKACCTTO")?;
            self.build_bank_account(doc, account)?;
            doc.end("BANKACCTTO")?;
        }

        log::debug!("wrote STMTTRN {:?}", line.id);
        doc.end("STMTTRN")
    }

    fn build_bank_account(&self, doc: &mut Document, account: &BankAccount) -> WriteResult {
        doc.mandatory("BANKID", Some(account.bank_id.as_str()))?;
        doc.optional("BRANCHID", account.branch_id.as_deref())?;
        doc.mandatory("ACCTID", Some(account.acct_id.as_str()))?;
        doc.mandatory("ACCTTYPE", Some(account.acct_type.as_str()))?;
        doc.optional("ACCTKEY", account.acct_key.as_deref())
    }
}

/// Element tree builder over a quick-xml writer.
///
/// Leaf elements are either mandatory (no value is an error naming the tag)
/// or optional (no value omits the element). Empty text counts as no value.
struct Document {
    writer: Writer<Vec<u8>>,
}

impl Document {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn start(&mut self, tag: &str) -> WriteResult {
        self.writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(xml_err)
    }

    fn end(&mut self, tag: &str) -> WriteResult {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_err)
    }

    fn text(&mut self, tag: &str, text: &str) -> WriteResult {
        self.start(tag)?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
            .map_err(xml_err)?;
        self.end(tag)
    }

    fn leaf(&mut self, tag: &'static str, value: Option<&str>, mandatory: bool) -> WriteResult {
        match value.filter(|v| !v.is_empty()) {
            Some(text) => self.text(tag, text),
            None if mandatory => Err(SerializationError::MissingValue { tag }),
            None => Ok(()),
        }
    }

    fn mandatory(&mut self, tag: &'static str, value: Option<&str>) -> WriteResult {
        self.leaf(tag, value, true)
    }

    fn optional(&mut self, tag: &'static str, value: Option<&str>) -> WriteResult {
        self.leaf(tag, value, false)
    }

    fn date(&mut self, tag: &'static str, value: Option<NaiveDate>, mandatory: bool) -> WriteResult {
        let text = value.map(|d| OfxDate(d).to_string());
        self.leaf(tag, text.as_deref(), mandatory)
    }

    fn datetime(&mut self, tag: &'static str, value: Option<OfxDateTime>) -> WriteResult {
        let text = value.map(|dt| dt.to_string());
        self.leaf(tag, text.as_deref(), true)
    }

    fn amount(&mut self, tag: &'static str, value: Option<Decimal>, mandatory: bool) -> WriteResult {
        let text = value.map(|a| OfxAmount(a).to_string());
        self.leaf(tag, text.as_deref(), mandatory)
    }

    fn finish(self) -> Result<String, SerializationError> {
        String::from_utf8(self.writer.into_inner()).map_err(xml_err)
    }
}
