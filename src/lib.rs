//! Turns an icon catalog into a generated source registry plus symbol,
//! bitmap and button documents whose identifiers stay stable across runs.

pub mod bitmaps;
pub mod buttons;
pub mod catalog;
pub mod codegen;
pub mod commands;
pub mod config;
pub mod documents;
pub mod error;
pub mod interop;
pub mod output;
pub mod partition;
pub mod strip;
pub mod symbols;
pub mod synthesis;

pub use catalog::{Catalog, Collection, Icon};
pub use config::SynthesisConfig;
pub use error::{Result, SynthesisError};
