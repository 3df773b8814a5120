pub mod error;
pub mod identity;
pub mod provider;
pub mod types;

pub use error::{SessionError, SessionResult};
pub use identity::{IdentityClient, SESSION_KEY};
pub use provider::{AuthHandler, SessionProvider, Subscription, UnconfiguredIdentity};
pub use types::{AuthEvent, Session, User};
