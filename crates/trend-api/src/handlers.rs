//! Request handlers.

pub mod auth;
pub mod health;
pub mod ideas;
pub mod trends;

pub use health::*;
pub use ideas::*;
pub use trends::*;
