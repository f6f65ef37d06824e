//! The URIs of the pages, fragments and form endpoints served to the browser.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_id}/edit', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing the user's bank accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for adding a bank account.
pub const NEW_ACCOUNT_VIEW: &str = "/accounts/new";
/// The page for editing a bank account.
pub const EDIT_ACCOUNT_VIEW: &str = "/accounts/{account_id}/edit";
/// The page for displaying transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page listing the user's fund requests.
pub const FUND_REQUESTS_VIEW: &str = "/fund-requests";
/// The page for raising a fund request.
pub const NEW_FUND_REQUEST_VIEW: &str = "/fund-requests/new";
/// The page listing the user's transfer requests.
pub const TRANSFERS_VIEW: &str = "/transfers";
/// The page for raising a transfer request.
pub const NEW_TRANSFER_VIEW: &str = "/transfers/new";
/// The page showing the logged in user's profile.
pub const PROFILE_VIEW: &str = "/profile";
/// The admin page for reviewing fund and transfer requests.
pub const REVIEW_VIEW: &str = "/admin/review";
/// The admin page listing users waiting for portal access.
pub const PENDING_USERS_VIEW: &str = "/admin/users";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for requesting a password reset email.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The table fragment for the accounts page.
pub const ACCOUNTS_TABLE: &str = "/fragments/accounts";
/// The table fragment for the transactions page.
pub const TRANSACTIONS_TABLE: &str = "/fragments/transactions";
/// The table fragment for the user's fund requests.
pub const FUND_REQUESTS_TABLE: &str = "/fragments/fund-requests";
/// The table fragment for the user's transfer requests.
pub const TRANSFERS_TABLE: &str = "/fragments/transfers";
/// The table fragment for the admin review page.
pub const REVIEW_TABLE: &str = "/fragments/review";
/// The table fragment for the pending users page.
pub const PENDING_USERS_TABLE: &str = "/fragments/users";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for registering a new user.
pub const REGISTER_API: &str = "/api/register";
/// The route for sending a password reset email.
pub const FORGOT_PASSWORD_API: &str = "/api/forgot_password";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create a bank account.
pub const ACCOUNTS_API: &str = "/api/accounts";
/// The route to update or delete a bank account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to make a bank account the default account.
pub const DEFAULT_ACCOUNT: &str = "/api/accounts/{account_id}/default";
/// The route to raise a fund request.
pub const FUND_REQUESTS_API: &str = "/api/fund-requests";
/// The route to raise a transfer request.
pub const TRANSFERS_API: &str = "/api/transfers";
/// The route to update the user's profile.
pub const PROFILE_API: &str = "/api/profile";
/// The route to change the user's password.
pub const CHANGE_PASSWORD_API: &str = "/api/profile/password";
/// The route that empties the modal container.
pub const CLOSE_MODAL: &str = "/api/modal/close";

/// The route that opens the transaction ID modal for a request.
pub const PROCESS_MODAL: &str = "/api/review/{kind}/{request_id}/process/modal";
/// The route that re-validates the transaction ID modal as the admin types.
pub const PROCESS_MODAL_VALIDATE: &str = "/api/review/{kind}/{request_id}/process/validate";
/// The route that moves a pending request to processing.
pub const PROCESS_REQUEST: &str = "/api/review/{kind}/{request_id}/process";
/// The route that opens the rejection reason modal for a request.
pub const REJECT_MODAL: &str = "/api/review/{kind}/{request_id}/reject/modal";
/// The route that re-validates the rejection reason modal as the admin types.
pub const REJECT_MODAL_VALIDATE: &str = "/api/review/{kind}/{request_id}/reject/validate";
/// The route that rejects a processing request.
pub const REJECT_REQUEST: &str = "/api/review/{kind}/{request_id}/reject";
/// The route that completes a processing request.
pub const APPROVE_REQUEST: &str = "/api/review/{kind}/{request_id}/approve";

/// The route that opens the user details modal.
pub const USER_MODAL: &str = "/api/users/{user_id}/modal";
/// The route that re-validates the user details modal.
pub const USER_MODAL_VALIDATE: &str = "/api/users/{user_id}/modal/validate";
/// The route that grants or denies a user portal access.
pub const PORTAL_ACCESS: &str = "/api/users/{user_id}/portal-access";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// Paths with several parameters are filled by calling this function once per
/// parameter, left to right.
///
/// This function assumes that an endpoint path only contains ASCII characters.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.char_indices() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
