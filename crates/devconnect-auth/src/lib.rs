//! Authentication building blocks: token issuing/verification, password
//! hashing, and the pure access-policy checks. No I/O in this crate; the
//! HTTP layer owns cookies and headers, the store owns persistence.

pub mod password;
pub mod policy;
pub mod token;
