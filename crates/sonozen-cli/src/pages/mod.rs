pub mod analysis;
pub mod auth;
pub mod dashboard;
pub mod landing;

pub use analysis::{SubmitOutcome, SubmitPage, EMPTY_INPUT_MESSAGE};
pub use auth::AuthPage;
pub use dashboard::render_dashboard;
pub use landing::render_landing;
