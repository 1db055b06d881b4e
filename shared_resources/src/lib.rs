pub mod config;
pub mod direction;
pub mod error;
pub mod links;
pub mod message;
pub mod message_channel;
pub mod work_queue;

pub use direction::Direction;
pub use message::{Message, MessageKind};
