//! Fund and transfer requests and the review workflow they share.

mod core;
mod create;
mod my_requests;
mod table;
mod workflow;

pub use core::{
    FundRequest, NewFundRequest, NewTransferRequest, RequestId, RequestKind, Reviewable,
    TransferRequest,
};
pub use create::{
    create_fund_request_endpoint, create_transfer_request_endpoint, get_new_fund_request_page,
    get_new_transfer_page,
};
pub use my_requests::{
    get_fund_requests_page, get_fund_requests_table, get_transfers_page, get_transfers_table,
    status_categories,
};
pub use table::{TableMode, requests_table, review_url};
pub use workflow::{
    ProcessInput, RejectionReason, RequestStatus, ReviewAction, ReviewCommand, ReviewState,
    WorkflowError, check_record, resolve_rejection_reason,
};
