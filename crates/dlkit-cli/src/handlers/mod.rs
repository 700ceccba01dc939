//! Command handlers.
//!
//! Handlers are thin: they translate CLI arguments into session calls and
//! leave all download semantics to `dlkit-download`.

pub mod get;
pub mod resolve;
