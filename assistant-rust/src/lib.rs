pub mod artifact;
pub mod config;
pub mod conversation;
mod errors;
pub mod gateway;
pub mod git;
pub mod orchestrator;
pub mod prompt;
pub mod server;

pub use config::{AssistantConfig, ConfirmationProtocol};
pub use conversation::{Conversation, ConversationTurn, PendingArtifact, Role};
pub use errors::{AssistantError, BoxedError};
pub use gateway::{AssistantGateway, GatewayReply};
pub use git::{GitError, GitRepository, VersionControl};
pub use orchestrator::{CommitOrchestrator, CommitOrchestratorOptions};
