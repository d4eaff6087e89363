//! Authentication for the MapleStore API
//!
//! - JWT token generation and validation (single account-id claim)
//! - Request extractors enforcing the user/admin route guards

mod extract;
mod jwt;

pub use extract::{AdminUser, AuthUser};
pub use jwt::{generate_token, verify_token, Claims};
