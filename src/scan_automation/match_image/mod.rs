//! Template loading for the scan loop
//!
//! This module turns a declarative scan configuration into ready-to-match
//! templates: zones resolved to absolute regions, reference images decoded
//! and prepared for correlation.

pub mod config;
pub mod region;
pub mod template;


// Re-export main types and functions
pub use config::{ActionEvent, InterruptConfig, ScanConfig, TemplateConfig, Zone};
pub use region::{RegionMapper, to_absolute};
pub use template::{InterruptTemplate, Template, TemplateStore};
