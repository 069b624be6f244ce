pub mod admin;
pub mod ask;
pub mod chats;
pub mod common;
pub mod events;
pub mod health;
pub mod messages;
