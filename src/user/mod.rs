//! Users, roles, profiles and the admin review of portal access.

mod actions;
mod core;
mod pending_users_page;
mod profile;

pub use actions::{get_user_modal, submit_portal_access, validate_user_modal};
pub use core::{PortalAccessDecision, ProfileUpdate, Role, User, UserId, UserRef};
pub use pending_users_page::{get_pending_users_page, get_pending_users_table};
pub use profile::{change_password, get_profile_page, update_profile};
