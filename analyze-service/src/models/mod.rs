pub mod analyze;

pub use analyze::{AnalyzeRequest, AnalyzeResponse};
