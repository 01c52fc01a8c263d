pub mod session_store;
pub mod session_service;

pub use session_store::SessionStore;
pub use session_service::{SessionError, SessionService};
