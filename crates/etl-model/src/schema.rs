//! Column and table names shared by every stage.

pub const TRANSACTION_ID: &str = "transaction_id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const TRANSACTION_DATE: &str = "transaction_date";
pub const AMOUNT: &str = "amount";

pub const NAME: &str = "name";
pub const AGE: &str = "age";
pub const COUNTRY: &str = "country";
pub const IS_ACTIVE: &str = "is_active";

pub const TOTAL_SPEND: &str = "total_spend";
pub const AVG_TRANSACTION_VALUE: &str = "avg_transaction_value";

/// Literal marker used by the source system for a corrupt amount.
pub const INVALID_AMOUNT: &str = "INVALID";

/// Target table receiving the merged transactions.
pub const MERGED_TABLE: &str = "transactions_by_customers";

/// Customer attributes carried into the high-value aggregate, in output order.
pub const CUSTOMER_ATTRIBUTES: [&str; 4] = [NAME, AGE, COUNTRY, IS_ACTIVE];

pub const CLEANED_TRANSACTIONS: &str = "cleaned_transactions";
pub const CLEANED_CUSTOMERS: &str = "cleaned_customers";
pub const MERGED_DATA: &str = "merged_data";
pub const HIGH_VALUE_CUSTOMERS: &str = "high_value_customers";
pub const CLEANED_HIGH_VALUE_CUSTOMERS: &str = "cleaned_high_value_customers";
