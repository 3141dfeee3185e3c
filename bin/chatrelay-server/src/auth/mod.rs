//! Account primitives: password hashing/rules and opaque token keys.

pub mod password;
pub mod token;

pub use password::{dummy_password_hash, hash_password, validate_password, verify_password};
pub use token::{generate_key, parse_authorization, HeaderProblem};
