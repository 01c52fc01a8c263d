pub mod gateway;
pub mod handler;
pub mod msg_join_handler;
pub mod msg_code_handler;
pub mod msg_language_handler;
pub mod msg_cursor_handler;

pub use gateway::Gateway;
pub use handler::websocket_handler;
