pub mod health;
pub mod session;
pub mod diagnostics;

pub use health::*;
pub use session::*;
pub use diagnostics::*;
