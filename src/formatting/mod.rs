// src/formatting/mod.rs
//! Turns a fetched block tree into the plain text sent for summarizing.

mod flatten;
mod markup;

pub use self::flatten::{flatten, flatten_all};
pub use self::markup::EmphasisRenderer;
