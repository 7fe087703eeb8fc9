//! Repository interfaces for persistent state.

pub mod token;

pub use token::TokenRepository;

#[cfg(test)]
pub use token::MockTokenRepository;
