pub mod session;
pub mod messages;
pub mod health;
pub mod diagnostics;
pub mod error;

pub use session::*;
pub use messages::*;
pub use health::*;
pub use diagnostics::*;
pub use error::*;
