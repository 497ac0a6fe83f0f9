//! CSV export of the transaction ledger.
use csv::WriterBuilder;

use crate::bank::{Transaction, format_money};

pub const STATEMENT_FILE_NAME: &str = "transaction_statement.csv";

const HEADER: [&str; 3] = ["Date", "Transaction Type", "Amount"];
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes the header row and one row per transaction, in the given order.
pub fn write_statement<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for tx in transactions {
        writer.write_record([
            tx.get_timestamp().format(DATE_FORMAT).to_string(),
            tx.get_type().to_string(),
            format_money(tx.get_amount()),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::bank::Account;

    #[test]
    fn test_empty_statement_has_header() {
        let csv = write_statement(&Vec::<Transaction>::new()).unwrap();
        assert_eq!(String::from_utf8(csv).unwrap(), "Date,Transaction Type,Amount\n");
    }

    #[test]
    fn test_rows_follow_ledger_order() {
        let mut account = Account::new("1234", 5_000_000);
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        account.deposit(1_000_000, at).unwrap();
        account.withdraw(6_000_000, at).unwrap();
        account.deposit(2_500, at).unwrap();

        let csv = String::from_utf8(write_statement(account.ledger().all()).unwrap()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Transaction Type,Amount",
                "2024-03-09 14:05:00,Deposit,100.00",
                "2024-03-09 14:05:00,Withdrawal,600.00",
                "2024-03-09 14:05:00,Deposit,0.25",
            ]
        );
    }
}
