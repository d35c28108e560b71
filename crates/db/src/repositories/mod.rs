pub mod conversation_repo;
pub mod message_repo;

pub use conversation_repo::ConversationRepo;
pub use message_repo::MessageRepo;
