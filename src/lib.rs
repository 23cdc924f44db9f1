//! Compile specification anchor data into the on-disk cross-reference
//! indices a document build uses to resolve links by text, by context,
//! or by URL.

pub mod anchors;
pub mod compile;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fors;
pub mod headings;
pub mod identity;
pub mod linearize;
pub mod lookup;
pub mod methods;
pub mod normalize;
pub mod output;
pub mod shard;
pub mod types;

pub use crate::compile::{Summary, compile, compile_with};
pub use crate::error::Error;
