//! Page extraction
//!
//! Load wait, DOM idle detection, and document serialization over CDP.

pub mod idle;
pub mod js_scripts;
pub mod page;
pub mod types;

pub use idle::{ActivityProbe, DomActivityProbe, IdleOutcome, IdleWait};
pub use page::{ExtractOptions, extract_page};
pub use types::{ExtractionOutcome, ExtractionResult, PageCapture};
