#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod http;

use time::Date;

use crate::transaction::{
    CategoryTag, Transaction, TransactionDate, TransactionStatus, UNKNOWN_PARTY,
};

pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, get_header};

/// A completed transaction on `date` with no fee and unknown parties.
pub(crate) fn dated_transaction(
    id: &str,
    category: CategoryTag,
    amount: u64,
    date: Date,
) -> Transaction {
    transaction(id, category, amount, TransactionDate::Parsed(date))
}

/// A transaction whose datetime could not be parsed.
pub(crate) fn undated_transaction(
    id: &str,
    category: CategoryTag,
    amount: u64,
    raw_date: &str,
) -> Transaction {
    transaction(
        id,
        category,
        amount,
        TransactionDate::Unreliable(raw_date.to_owned()),
    )
}

fn transaction(id: &str, category: CategoryTag, amount: u64, date: TransactionDate) -> Transaction {
    Transaction {
        id: id.to_owned(),
        category,
        amount,
        fee: 0,
        display_date: date.display_text(),
        date,
        sender: UNKNOWN_PARTY.to_owned(),
        recipient: UNKNOWN_PARTY.to_owned(),
        status: TransactionStatus::Completed,
        raw_text: None,
        code: None,
        account_or_phone: None,
    }
}
