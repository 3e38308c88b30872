//! Toolchain acquisition: where sources come from, how they are fetched,
//! verified and unpacked, and how each tool is configured and built.

pub mod archive;
pub mod download;
pub mod recipes;
pub mod sources;

pub use download::{progress_percentage, Downloader};
pub use sources::{SourceTable, ToolSource};
