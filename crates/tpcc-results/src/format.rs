//! Human-readable rendering of a results document.

use crate::document::{ResultsDocument, TotalRow, TxnRow};
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

/// Render committed and aborted transactions as tables.
pub fn format_table(document: &ResultsDocument) -> String {
    let mut output = String::new();

    if let Some(load_time) = document.load_time {
        output.push_str(&format!("Data Loading Time: {load_time:.0} seconds\n\n"));
    }
    output.push_str(&format!(
        "Execution Results after {:.0} seconds\n",
        document.txns_total.duration
    ));
    output.push_str(&render(&document.txns, &document.txns_total));

    if !document.txns_aborted.is_empty() {
        output.push_str("\nAborted Transactions\n");
        output.push_str(&render(&document.txns_aborted, &document.txns_aborted_total));
    }

    if document.delivery_skipped > 0
        || document.new_order_rollbacks > 0
        || document.interrupted > 0
    {
        output.push_str(&format!(
            "\nDelivery districts skipped: {}  NewOrder rollbacks: {}  Interrupted: {}\n",
            document.delivery_skipped, document.new_order_rollbacks, document.interrupted
        ));
    }

    output
}

fn render(rows: &[TxnRow], total: &TotalRow) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["", "Executed", "Time (µs)", "Rate"]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.txn.as_str()),
            Cell::new(row.ct),
            Cell::new(micros(row.time)),
            Cell::new(rate(row.ct, row.time)),
        ]);
    }

    table.add_row(vec![
        Cell::new("TOTAL").fg(Color::Cyan),
        Cell::new(total.ct),
        Cell::new(micros(total.duration)),
        Cell::new(rate(total.ct, total.duration)),
    ]);

    let mut rendered = table.to_string();
    rendered.push('\n');
    rendered
}

fn micros(secs: f64) -> u64 {
    (secs * 1_000_000.0) as u64
}

fn rate(count: u64, secs: f64) -> String {
    if secs > 0.0 {
        format!("{:.2} txn/s", count as f64 / secs)
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpcc_types::TransactionType;

    fn document() -> ResultsDocument {
        ResultsDocument {
            load_time: None,
            txns: vec![TxnRow {
                txn: TransactionType::NewOrder,
                ct: 20,
                time: 2.0,
            }],
            txns_aborted: Vec::new(),
            txns_total: TotalRow {
                ct: 20,
                time: 2.0,
                duration: 4.0,
            },
            txns_aborted_total: TotalRow {
                ct: 0,
                time: 0.0,
                duration: 4.0,
            },
            txns_detail: None,
            delivery_skipped: 0,
            new_order_rollbacks: 0,
            interrupted: 0,
        }
    }

    #[test]
    fn test_table_contains_rates() {
        let rendered = format_table(&document());
        assert!(rendered.contains("Execution Results after 4 seconds"));
        assert!(rendered.contains("NEW_ORDER"));
        assert!(rendered.contains("10.00 txn/s"));
        assert!(rendered.contains("5.00 txn/s"));
        assert!(rendered.contains("4000000"));
        assert!(!rendered.contains("Aborted Transactions"));
    }

    #[test]
    fn test_zero_time_has_no_rate() {
        assert_eq!(rate(0, 0.0), "-");
        assert_eq!(rate(3, 1.5), "2.00 txn/s");
    }
}
