pub mod admin;
pub mod analytics;
pub mod ask;
pub mod common;
pub mod completions;
pub mod conversations;
pub mod credits;
pub mod feedback;
pub mod search;

#[cfg(any(test, feature = "test-mocks"))]
pub mod testing;

pub use admin::AdminServiceImpl;
pub use analytics::AnalyticsServiceImpl;
pub use ask::AskServiceImpl;
pub use completions::CompletionServiceImpl;
pub use conversations::ConversationServiceImpl;
pub use credits::CreditServiceImpl;
pub use feedback::FeedbackServiceImpl;
pub use search::RetrievalServiceImpl;
