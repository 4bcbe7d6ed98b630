//! The transaction pipeline.
//!
//! This module contains everything that works on the canonical transaction
//! model:
//! - `Transaction` and `CategoryTag`, the canonical model
//! - Normalization of untrusted records into transactions
//! - Filtering transactions by display period
//! - Paging the transaction table and looking up rows by ID

mod category;
mod core;
mod normalize;
mod period;
mod table;

pub use category::CategoryTag;
pub use core::{Transaction, TransactionDate, TransactionStatus, UNKNOWN_PARTY};
pub use normalize::{NormalizationFailure, RawRecord, normalize, normalize_payload};
pub use period::{DateRange, Period, date_range, filter_by_period};
pub use table::{TableConfig, TransactionIndex, is_fully_loaded, page};

pub(crate) use normalize::{integer_field, parse_date};
