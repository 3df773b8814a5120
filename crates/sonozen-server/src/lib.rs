pub mod analyzer;
pub mod handlers;
pub mod logging;
pub mod server;
pub mod state;

pub use analyzer::{SleepAnalyzer, SYSTEM_PROMPT};
pub use server::{create_router, run_server};
pub use state::{
    AnalysisModel, AppState, ConfiguredProviderSource, LlmOverrides, ProviderSource,
    StaticProviderSource,
};
