//! Core types for the Playbooks gateway.

mod fragment;
mod identifiers;
mod session;
mod trace;

pub use fragment::*;
pub use identifiers::*;
pub use session::*;
pub use trace::*;
