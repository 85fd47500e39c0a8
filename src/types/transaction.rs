//! Transaction record scored by the risk engine

use serde::{Deserialize, Serialize};

/// Default amount when the field is absent
pub const DEFAULT_AMOUNT: f64 = 0.0;
/// Default hour of day when the field is absent
pub const DEFAULT_TRANSACTION_TIME: i64 = 12;
/// Default device type when the field is absent
pub const DEFAULT_DEVICE_TYPE: &str = "Mobile";
/// Default merchant category when the field is absent
pub const DEFAULT_MERCHANT_CATEGORY: &str = "Retail";

/// Device types offered by the interactive collector.
pub const DEVICE_TYPES: [&str; 3] = ["Mobile", "Web", "POS"];

/// Merchant categories offered by the interactive collector.
pub const MERCHANT_CATEGORIES: [&str; 5] = ["Retail", "Food", "Electronics", "Luxury", "Grocery"];

/// A transaction to be scored.
///
/// Every field falls back to its default when absent. No other validation
/// happens: out-of-range values are scored as-is, and category strings
/// outside the known sets are accepted (they just never match a category
/// rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Amount in currency units
    #[serde(default = "default_amount")]
    pub amount: f64,

    /// Hour of day, nominally 0..=23
    #[serde(default = "default_transaction_time")]
    pub transaction_time: i64,

    /// Device the transaction originated from (Mobile, Web, POS, ...)
    #[serde(default = "default_device_type")]
    pub device_type: String,

    /// Merchant category (Retail, Food, Electronics, Luxury, Grocery, ...)
    #[serde(default = "default_merchant_category")]
    pub merchant_category: String,
}

fn default_amount() -> f64 {
    DEFAULT_AMOUNT
}

fn default_transaction_time() -> i64 {
    DEFAULT_TRANSACTION_TIME
}

fn default_device_type() -> String {
    DEFAULT_DEVICE_TYPE.to_string()
}

fn default_merchant_category() -> String {
    DEFAULT_MERCHANT_CATEGORY.to_string()
}

impl TransactionRecord {
    /// Create a record from all four fields
    pub fn new(
        amount: f64,
        transaction_time: i64,
        merchant_category: impl Into<String>,
        device_type: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            transaction_time,
            device_type: device_type.into(),
            merchant_category: merchant_category.into(),
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_transaction_time(mut self, hour: i64) -> Self {
        self.transaction_time = hour;
        self
    }

    pub fn with_merchant_category(mut self, category: impl Into<String>) -> Self {
        self.merchant_category = category.into();
        self
    }

    pub fn with_device_type(mut self, device: impl Into<String>) -> Self {
        self.device_type = device.into();
        self
    }
}

impl Default for TransactionRecord {
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT,
            transaction_time: DEFAULT_TRANSACTION_TIME,
            device_type: default_device_type(),
            merchant_category: default_merchant_category(),
        }
    }
}
