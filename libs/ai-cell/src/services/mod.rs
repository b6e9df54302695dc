pub mod analysis;
pub mod chat;

pub use analysis::AnalysisService;
pub use chat::ChatService;
