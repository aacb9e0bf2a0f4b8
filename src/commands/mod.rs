//! Command handlers outside of control flow, grouped by what they act on.

pub mod audio;
pub mod message;
pub mod objects;
pub mod script;
pub mod variables;
