//! Authentication utilities
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and the write-only `PasswordHash`
//! - [`session`]: Session id generation and HMAC-signed cookie values
//!
//! # Example
//!
//! ```no_run
//! use taskhub_shared::auth::password::PasswordHash;
//! use taskhub_shared::auth::session::{generate_session_id, sign_session_id};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = PasswordHash::generate("user_password")?;
//! assert!(hash.verify("user_password")?);
//!
//! let cookie_value = sign_session_id(&generate_session_id(), b"server-secret");
//! # Ok(())
//! # }
//! ```

pub mod password;
pub mod session;
