//! Log in, log out and the middleware that guards the rest of the app.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_api, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
use token::Token;
pub use user::{User, UserID, create_user, create_user_table, get_user_by_id, update_password};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::AuthState;
