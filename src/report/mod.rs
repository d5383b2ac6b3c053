//! Report generation modules.
//!
//! This module provides the Excel workbook writer and the console
//! insights/preview renderers.

pub mod generator;
pub mod workbook;

pub use generator::{generate_json_insights, generate_markdown_insights, generate_preview};
pub use workbook::{ReportWriter, WorkbookOptions};
