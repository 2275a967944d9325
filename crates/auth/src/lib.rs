//! `kbdhub-auth` — pure authentication boundary.
//!
//! This crate is intentionally decoupled from transport and storage: token
//! decoding/verification happens at the invocation boundary, and only the
//! already-decoded identity arrives here.

pub mod principal;

pub use principal::{Claims, Principal};
