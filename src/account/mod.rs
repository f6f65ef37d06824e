mod accounts_page;
mod core;
mod create_endpoint;
mod create_page;
mod default_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;

pub use accounts_page::{get_accounts_page, get_accounts_table};
pub use core::{
    AccountDraft, AccountId, AccountRef, BankAccount, default_account, set_default_account,
    total_balance,
};
pub use create_endpoint::create_account_endpoint;
pub use create_page::get_new_account_page;
pub use default_endpoint::set_default_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
pub use edit_page::get_edit_account_page;
