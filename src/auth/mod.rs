//! Log in, registration, sessions and the guards that protect routes.

mod cookie;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use forgot_password::{get_forgot_password_page, post_forgot_password};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, Session, admin_guard, auth_guard, auth_guard_hx};
pub use password::{PASSWORD_INPUT_MIN_LENGTH, check_password_strength};
pub use redirect::normalize_redirect_url;
pub use register::{get_register_page, register_user};
pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
