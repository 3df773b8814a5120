//! SonoZen core types
//!
//! Analysis records, the analyze endpoint's request/response envelope, the error
//! taxonomy shared by server and client, and dashboard aggregation.

pub mod api;
pub mod dashboard;
pub mod error;
pub mod record;

pub use api::{validate_message, AnalyzeRequest, AnalyzeResponse};
pub use dashboard::{average_score, DashboardSummary};
pub use error::{AnalysisError, EMPTY_MESSAGE, GENERIC_FAILURE_MESSAGE, UPSTREAM_FALLBACK_MESSAGE};
pub use record::{SleepAnalysis, SleepAnalysisRecord};

/// Route of the analysis endpoint.
pub const ANALYZE_PATH: &str = "/api/analyze-sleep";
