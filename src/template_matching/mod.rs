/// Template matching module for locating reference images in captured regions
///
/// This module provides:
/// - Grayscale conversion of both inputs before comparison
/// - Zero-mean normalized cross-correlation scores in [-1, 1]
/// - Best-match selection in raster order with threshold gating
/// - A size guard that rejects templates larger than the region
pub mod matcher;
pub mod types;

pub use matcher::{TemplateMatcher, correlation_surface, find_match};
pub use types::MatchResult;
