//! Cryptographic helpers shared by the adoption backend.
//!
//! - `shelter_token`: authenticated encryption of shelter registration numbers for URLs
//! - `hash`: SHA-256 helpers and visitor-id derivation for view counting
//! - `jwt`: RS256 bearer token validation
pub mod hash;
pub mod jwt;
pub mod shelter_token;

pub use shelter_token::{ShelterTokenCodec, TokenCodecError};
