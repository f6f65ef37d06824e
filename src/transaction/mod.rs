//! Transactions recorded by the backend and the page that lists them.

mod core;
mod transactions_page;

pub use core::{Transaction, TransactionType};
pub(crate) use transactions_page::transactions_rows;
pub use transactions_page::{get_transactions_page, get_transactions_table};
