//! Where administrators review fund and transfer requests.

mod actions;
mod review_page;

pub use actions::{
    approve_request, get_process_modal, get_reject_modal, process_request, reject_request,
    validate_process_modal, validate_reject_modal,
};
pub use review_page::{get_review_page, get_review_table};
