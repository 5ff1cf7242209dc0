use ofx_statement_rs::errors::ParseError;
use ofx_statement_rs::{
    BankAccount, CsvStatementParser, FieldMapping, OfxWriter, Statement, StatementParser,
    TransactionLine, generate_stable_transaction_id, parse_iban, recalculate_balance,
};
use std::env;
use std::fs::File;
use std::io::Read;

const IBAN_COLUMN: usize = 5;

/// CSV export whose last column holds the counterparty IBAN
struct BankExportParser<R> {
    inner: CsvStatementParser<R>,
}

impl<R: Read> StatementParser for BankExportParser<R> {
    type Record = csv::StringRecord;
    type Records = <CsvStatementParser<R> as StatementParser>::Records;

    fn split_records(&mut self) -> Result<Self::Records, ParseError> {
        self.inner.split_records()
    }

    fn parse_record(&self, record: &csv::StringRecord) -> Result<Option<TransactionLine>, ParseError> {
        let Some(mut line) = self.inner.parse_record(record)? else {
            return Ok(None);
        };

        let iban = record.get(IBAN_COLUMN).unwrap_or("");
        if let Some(account) = BankAccount::from_iban_parts(parse_iban(iban)) {
            line.bank_account_to = Some(account);
            line.id = Some(generate_stable_transaction_id(&line));
        }
        Ok(Some(line))
    }

    fn start_statement(&self) -> Statement {
        self.inner.start_statement()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let file_path = if args.len() > 1 {
        &args[1]
    } else {
        eprintln!("Using example CSV data from demos/sample.csv\n");
        "demos/sample.csv"
    };

    let mapping = FieldMapping::new([
        ("date_posted", 0),
        ("amount", 1),
        ("payee", 2),
        ("memo", 3),
        ("trn_type", 4),
    ])?;

    let mut file = File::open(file_path)?;
    let mut parser = BankExportParser {
        inner: CsvStatementParser::new(&mut file, mapping)
            .has_headers(true)
            .account("37040044", "532013000", "EUR"),
    };

    let mut statement = parser.parse()?;
    recalculate_balance(&mut statement)?;
    statement.assert_valid()?;

    eprintln!("Found {} transactions\n", statement.lines.len());
    for line in statement.lines.iter().take(10) {
        eprintln!("{line}\n");
    }

    let ofx = OfxWriter::new(&statement).app("convert_csv", "0.1.0").to_ofx()?;
    println!("{ofx}");

    Ok(())
}
