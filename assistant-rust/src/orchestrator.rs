use crate::{
    artifact,
    gateway::{AssistantGateway, GatewayReply},
    prompt, AssistantError, ConfirmationProtocol, Conversation, VersionControl,
};
use assistant_llm::LanguageModel;
use serde::Deserialize;
use serde_json::Value;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Messages that confirm a pending artifact, compared after trimming and
/// lowercasing.
pub const CONFIRMATION_TOKENS: [&str; 5] = ["yes", "yeah", "yep", "ok", "git"];
/// Appended to a reply that produced a new pending artifact.
pub const CONFIRMATION_PROMPT: &str = "\n\nWould you like me to commit this to Git? (yes/yeah/ok/git)";
pub const COMMIT_MESSAGE: &str = "Add generated feature from AI agent";
/// Directory under the repository root that generated features are written to.
pub const FEATURES_DIR: &str = "features";

#[must_use]
pub fn is_confirmation(message: &str) -> bool {
    let normalized = message.trim().to_lowercase();
    CONFIRMATION_TOKENS.contains(&normalized.as_str())
}

#[must_use]
pub fn commit_acknowledgement(filename: &str) -> String {
    format!("✅ Feature `{filename}` committed and pushed to Git!")
}

pub struct CommitOrchestratorOptions {
    pub model: Arc<dyn LanguageModel>,
    pub version_control: Arc<dyn VersionControl>,
    pub protocol: ConfirmationProtocol,
    /// Root of the working copy `version_control` operates on.
    pub repo_root: PathBuf,
    /// Documentation embedded in every prompt.
    pub context_path: PathBuf,
}

/// Arguments of a `commit_and_push_yaml` call.
#[derive(Debug, Deserialize)]
struct CommitArgs {
    filename: String,
    content: String,
}

/// Drives one conversation: decides per message whether to commit the pending
/// artifact or to ask the model, and performs the commit procedure.
///
/// The transcript and the pending artifact live behind one mutex that is held
/// for a whole request, so concurrent requests are handled one at a time.
pub struct CommitOrchestrator {
    gateway: AssistantGateway,
    version_control: Arc<dyn VersionControl>,
    protocol: ConfirmationProtocol,
    repo_root: PathBuf,
    context_path: PathBuf,
    conversation: Mutex<Conversation>,
}

impl CommitOrchestrator {
    #[must_use]
    pub fn new(options: CommitOrchestratorOptions) -> Self {
        let CommitOrchestratorOptions {
            model,
            version_control,
            protocol,
            repo_root,
            context_path,
        } = options;

        Self {
            gateway: AssistantGateway::new(model, protocol),
            version_control,
            protocol,
            repo_root,
            context_path,
            conversation: Mutex::new(Conversation::default()),
        }
    }

    /// A copy of the current transcript and pending artifact.
    pub async fn snapshot(&self) -> Conversation {
        self.conversation.lock().await.clone()
    }

    /// Handle one inbound message and return the reply text.
    ///
    /// On error nothing is recorded in the transcript and the pending artifact
    /// keeps the state it had before the failing step.
    pub async fn handle_message(&self, message: &str) -> Result<String, AssistantError> {
        let mut conversation = self.conversation.lock().await;

        let confirmed = match self.protocol {
            ConfirmationProtocol::Confirm if is_confirmation(message) => {
                conversation.pending().awaiting().map(str::to_owned)
            }
            _ => None,
        };

        let reply = if let Some(content) = confirmed {
            let filename = artifact::derive_filename(&content);
            let acknowledgement = self.commit(filename, &content).await?;
            conversation.pending_mut().clear();
            acknowledgement
        } else {
            self.converse(&mut conversation, message).await?
        };

        conversation.record_exchange(message, reply.clone());
        Ok(reply)
    }

    async fn converse(
        &self,
        conversation: &mut Conversation,
        message: &str,
    ) -> Result<String, AssistantError> {
        let documentation = tokio::fs::read_to_string(&self.context_path)
            .await
            .map_err(|source| AssistantError::Documentation {
                path: self.context_path.clone(),
                source,
            })?;

        let prompt = prompt::build_prompt(&documentation, conversation.history(), message);

        match self.gateway.ask(prompt).await? {
            GatewayReply::Text(text) => {
                if self.protocol != ConfirmationProtocol::Confirm {
                    return Ok(text);
                }
                match artifact::extract_yaml_block(&text) {
                    Some(block) => {
                        if conversation.pending().is_awaiting_confirmation() {
                            info!("replacing unconfirmed artifact with a newer one");
                        }
                        conversation.pending_mut().replace(block);
                        Ok(text + CONFIRMATION_PROMPT)
                    }
                    None => Ok(text),
                }
            }
            GatewayReply::StructuredCall { name, args } => {
                info!(capability = %name, "model requested a commit");
                let CommitArgs { filename, content } = parse_commit_args(args)?;
                let filename = artifact::sanitize_filename(&filename).ok_or_else(|| {
                    AssistantError::InvalidArtifact(format!("unusable filename `{filename}`"))
                })?;
                self.commit(filename, &content).await
            }
        }
    }

    /// Write `content` to `<repo_root>/features/<filename>`, then stage,
    /// commit and push it. Steps already done are not undone when a later one
    /// fails.
    async fn commit(&self, filename: &str, content: &str) -> Result<String, AssistantError> {
        let features_dir = self.repo_root.join(FEATURES_DIR);
        tokio::fs::create_dir_all(&features_dir)
            .await
            .map_err(|source| AssistantError::ArtifactWrite {
                path: features_dir.clone(),
                source,
            })?;

        let path = features_dir.join(filename);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| AssistantError::ArtifactWrite {
                path: path.clone(),
                source,
            })?;

        let relative_path = Path::new(FEATURES_DIR).join(filename);
        let result = async {
            self.version_control.stage(&relative_path).await?;
            self.version_control.commit(COMMIT_MESSAGE).await?;
            self.version_control.push().await
        }
        .await;

        if let Err(error) = result {
            warn!(%error, path = %path.display(), "commit procedure failed");
            return Err(error.into());
        }

        info!(path = %path.display(), "committed and pushed generated feature");
        Ok(commit_acknowledgement(filename))
    }
}

fn parse_commit_args(args: Value) -> Result<CommitArgs, AssistantError> {
    serde_json::from_value(args).map_err(|error| {
        AssistantError::InvalidArtifact(format!("malformed commit_and_push_yaml arguments: {error}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn confirmation_ignores_case_and_surrounding_whitespace() {
        for message in ["yes", "Yes", " yes ", "YES", "yeah", "Yep", "OK", "git\n"] {
            assert!(is_confirmation(message), "{message:?} should confirm");
        }
    }

    #[test]
    fn other_messages_are_not_confirmations() {
        for message in ["no", "yes please", "y", "okay", "", "git push"] {
            assert!(!is_confirmation(message), "{message:?} should not confirm");
        }
    }

    #[test]
    fn parses_commit_arguments() {
        let args = parse_commit_args(json!({ "filename": "a.yml", "content": "a: 1" }))
            .expect("valid arguments");
        assert_eq!(args.filename, "a.yml");
        assert_eq!(args.content, "a: 1");

        let error = parse_commit_args(json!({ "filename": "a.yml" })).expect_err("missing content");
        assert!(matches!(error, AssistantError::InvalidArtifact(_)));
    }
}
