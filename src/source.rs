//! Bulk transaction source: CSV tables with a header row
//!
//! Columns are matched by name (`amount`, `transaction_time`,
//! `merchant_category`, `device_type`); any of them may be missing, and
//! missing columns or empty cells take the field defaults. Other columns
//! are carried along untouched so results can be written next to the
//! source data.

use crate::config::InvalidRowPolicy;
use crate::error::{InputError, SourceReadError, SourceResult};
use crate::types::transaction::{
    TransactionRecord, DEFAULT_AMOUNT, DEFAULT_DEVICE_TYPE, DEFAULT_MERCHANT_CATEGORY,
    DEFAULT_TRANSACTION_TIME,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub const AMOUNT_COLUMN: &str = "amount";
pub const TIME_COLUMN: &str = "transaction_time";
pub const MERCHANT_COLUMN: &str = "merchant_category";
pub const DEVICE_COLUMN: &str = "device_type";

/// One accepted row of the source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based data line (header excluded)
    pub line: u64,
    /// Raw cells, in header order
    pub fields: Vec<String>,
    /// Coerced record
    pub record: TransactionRecord,
}

/// Everything read from one source
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
    /// Coercion failures; under `Skip` their rows are absent from `rows`
    pub rejected: Vec<InputError>,
}

impl SourceBatch {
    /// Records in source order, ready for `score_batch`
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.rows.iter().map(|r| r.record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Positions of the known columns in the header
#[derive(Debug, Default)]
struct Columns {
    amount: Option<usize>,
    time: Option<usize>,
    merchant: Option<usize>,
    device: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            amount: find(AMOUNT_COLUMN),
            time: find(TIME_COLUMN),
            merchant: find(MERCHANT_COLUMN),
            device: find(DEVICE_COLUMN),
        }
    }
}

/// Read a CSV file from disk
pub fn read_transactions_from_path<P: AsRef<Path>>(
    path: P,
    policy: InvalidRowPolicy,
) -> SourceResult<SourceBatch> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SourceReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Reading transaction source");
    read_transactions(file, policy)
}

/// Read CSV transactions from any reader.
///
/// Fails only if the source as a whole cannot be parsed; per-field
/// coercion problems are handled according to `policy` and reported in
/// [`SourceBatch::rejected`].
pub fn read_transactions<R: Read>(reader: R, policy: InvalidRowPolicy) -> SourceResult<SourceBatch> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(SourceReadError::MissingHeader);
    }

    let columns = Columns::locate(&headers);
    if columns.amount.is_none()
        || columns.time.is_none()
        || columns.merchant.is_none()
        || columns.device.is_none()
    {
        debug!(?columns, "Some transaction columns missing, defaults apply");
    }

    let mut batch = SourceBatch {
        headers: headers.iter().map(str::to_string).collect(),
        ..SourceBatch::default()
    };

    for (index, result) in csv_reader.records().enumerate() {
        let row = result?;
        // Header is file line 1; blank lines and quoted newlines count
        let line = row
            .position()
            .map(|p| p.line().saturating_sub(1))
            .unwrap_or(index as u64 + 1);
        let (record, errors) = coerce_row(&row, &columns, line);

        if !errors.is_empty() {
            for error in &errors {
                warn!(
                    line = error.line,
                    field = error.field,
                    value = %error.value,
                    policy = ?policy,
                    "Invalid field in transaction source"
                );
            }
            batch.rejected.extend(errors);
            if policy == InvalidRowPolicy::Skip {
                continue;
            }
        }

        batch.rows.push(SourceRow {
            line,
            fields: row.iter().map(str::to_string).collect(),
            record,
        });
    }

    info!(
        rows = batch.rows.len(),
        rejected = batch.rejected.len(),
        "Transaction source read"
    );

    Ok(batch)
}

/// Build a record from one row. Bad fields fall back to their defaults and
/// are returned as errors alongside the record.
fn coerce_row(
    row: &StringRecord,
    columns: &Columns,
    line: u64,
) -> (TransactionRecord, Vec<InputError>) {
    let cell = |index: Option<usize>| {
        index
            .and_then(|i| row.get(i))
            .filter(|value| !value.is_empty())
    };

    let mut errors = Vec::new();

    let amount = match cell(columns.amount) {
        Some(raw) => parse_amount(raw, line).unwrap_or_else(|e| {
            errors.push(e);
            DEFAULT_AMOUNT
        }),
        None => DEFAULT_AMOUNT,
    };

    let transaction_time = match cell(columns.time) {
        Some(raw) => parse_hour(raw, line).unwrap_or_else(|e| {
            errors.push(e);
            DEFAULT_TRANSACTION_TIME
        }),
        None => DEFAULT_TRANSACTION_TIME,
    };

    let merchant_category = cell(columns.merchant).unwrap_or(DEFAULT_MERCHANT_CATEGORY);
    let device_type = cell(columns.device).unwrap_or(DEFAULT_DEVICE_TYPE);

    let record = TransactionRecord::new(amount, transaction_time, merchant_category, device_type);
    (record, errors)
}

fn parse_amount(raw: &str, line: u64) -> Result<f64, InputError> {
    let invalid = |reason: &str| InputError {
        line,
        field: AMOUNT_COLUMN,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let amount: f64 = raw.parse().map_err(|_| invalid("not a number"))?;
    if !amount.is_finite() {
        return Err(invalid("not a finite number"));
    }
    Ok(amount)
}

/// Integer hours, or floats with no fractional part as spreadsheets write
/// them ("12.0")
fn parse_hour(raw: &str, line: u64) -> Result<i64, InputError> {
    let invalid = |reason: &str| InputError {
        line,
        field: TIME_COLUMN,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    if let Ok(hour) = raw.parse::<i64>() {
        return Ok(hour);
    }

    let hour: f64 = raw.parse().map_err(|_| invalid("not an integer hour"))?;
    if !hour.is_finite() || hour.fract() != 0.0 || hour.abs() > i64::MAX as f64 {
        return Err(invalid("not an integer hour"));
    }
    Ok(hour as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(csv: &str, policy: InvalidRowPolicy) -> SourceBatch {
        read_transactions(csv.as_bytes(), policy).unwrap()
    }

    #[test]
    fn test_full_columns() {
        let batch = read(
            "amount,transaction_time,merchant_category,device_type\n\
             250,12,Retail,Mobile\n\
             1500,2,Luxury,POS\n",
            InvalidRowPolicy::Skip,
        );

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.rows[1].record,
            TransactionRecord::new(1500.0, 2, "Luxury", "POS")
        );
        assert_eq!(batch.rows[0].line, 1);
        assert_eq!(batch.rows[1].line, 2);
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn test_column_order_and_extra_columns() {
        let batch = read(
            "id,device_type,amount,note\n\
             tx-1,POS,1200.5,first\n",
            InvalidRowPolicy::Skip,
        );

        assert_eq!(batch.headers, vec!["id", "device_type", "amount", "note"]);
        assert_eq!(batch.rows[0].fields, vec!["tx-1", "POS", "1200.5", "first"]);
        assert_eq!(
            batch.rows[0].record,
            TransactionRecord::new(1200.5, 12, "Retail", "POS")
        );
    }

    #[test]
    fn test_missing_columns_take_defaults() {
        let batch = read("note\nhello\n", InvalidRowPolicy::Skip);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.rows[0].record, TransactionRecord::default());
    }

    #[test]
    fn test_empty_cells_take_defaults() {
        let batch = read(
            "amount,transaction_time,merchant_category,device_type\n\
             ,  ,,\n",
            InvalidRowPolicy::Skip,
        );

        assert_eq!(batch.rows[0].record, TransactionRecord::default());
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn test_float_hours() {
        let batch = read(
            "amount,transaction_time\n10,3.0\n10,3.5\n",
            InvalidRowPolicy::Skip,
        );

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.rows[0].record.transaction_time, 3);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].field, TIME_COLUMN);
        assert_eq!(batch.rejected[0].line, 2);
    }

    #[test]
    fn test_invalid_row_skipped() {
        let batch = read(
            "amount,transaction_time\nabc,4\n1500,4\n",
            InvalidRowPolicy::Skip,
        );

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.rows[0].line, 2);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].field, AMOUNT_COLUMN);
        assert_eq!(batch.rejected[0].value, "abc");
    }

    #[test]
    fn test_invalid_field_defaulted() {
        let batch = read(
            "amount,transaction_time\nabc,4\ninf,x\n",
            InvalidRowPolicy::Default,
        );

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.rows[0].record.amount, 0.0);
        assert_eq!(batch.rows[0].record.transaction_time, 4);
        assert_eq!(batch.rows[1].record.amount, 0.0);
        assert_eq!(batch.rows[1].record.transaction_time, 12);
        assert_eq!(batch.rejected.len(), 3);
    }

    #[test]
    fn test_lines_count_blank_lines() {
        let batch = read(
            "amount,transaction_time\n100,1\n\noops,3\n2000,12\n",
            InvalidRowPolicy::Skip,
        );

        let lines: Vec<u64> = batch.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 4]);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].line, 3);
        assert_eq!(batch.rejected[0].value, "oops");
    }

    #[test]
    fn test_negative_amount_accepted() {
        let batch = read("amount\n-25\n", InvalidRowPolicy::Skip);
        assert_eq!(batch.rows[0].record.amount, -25.0);
    }

    #[test]
    fn test_header_only() {
        let batch = read("amount,transaction_time\n", InvalidRowPolicy::Skip);
        assert!(batch.is_empty());
        assert!(batch.records().is_empty());
    }

    #[test]
    fn test_empty_source_is_error() {
        let result = read_transactions("".as_bytes(), InvalidRowPolicy::Skip);
        assert!(matches!(result, Err(SourceReadError::MissingHeader)));
    }

    #[test]
    fn test_ragged_rows_are_error() {
        let result = read_transactions(
            "amount,transaction_time\n1,2\n3,4,5\n".as_bytes(),
            InvalidRowPolicy::Skip,
        );
        assert!(matches!(result, Err(SourceReadError::Malformed(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result =
            read_transactions_from_path("/nonexistent/transactions.csv", InvalidRowPolicy::Skip);
        assert!(matches!(result, Err(SourceReadError::Open { .. })));
    }
}
