pub mod admin;
pub mod analytics;
pub mod conversation;
pub mod credits;
pub mod feedback;
pub mod turn;

pub use admin::PgAdminRepository;
pub use analytics::PgAnalyticsRepository;
pub use conversation::PgConversationRepository;
pub use credits::PgCreditRepository;
pub use feedback::PgFeedbackRepository;
pub use turn::PgTurnRepository;
