//! SonoZen 终端客户端
//!
//! 首页、登录、提交分析与 dashboard 页面及导航栏，
//! 由分析服务端和本地历史记录支撑。

pub mod app;
pub mod client;
pub mod navbar;
pub mod pages;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::{App, Visit};
pub use client::{AnalysisBackend, AnalysisClient, ClientError};
pub use navbar::{NavItem, Navbar};
pub use router::{guard, Access, Navigation, Route};
