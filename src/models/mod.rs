pub mod conversation;
pub mod document;

pub use conversation::{ConversationTurn, Role};
pub use document::{Document, MediaType};
