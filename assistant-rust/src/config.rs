use crate::AssistantError;
use assistant_llm::google::{GoogleModel, GoogleModelOptions};
use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_CONTEXT_PATH: &str = "Context.md";
const DEFAULT_REPO_PATH: &str = "/app/repo";
const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_GIT_TIMEOUT_SECS: u64 = 120;

/// How a generated artifact gets from the model to the repository. Exactly one
/// protocol is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationProtocol {
    /// The model replies with a fenced YAML block, the block is held as the
    /// pending artifact, and a later confirmation message commits it.
    #[default]
    Confirm,
    /// The model is given the `commit_and_push_yaml` function and commits by
    /// calling it. No pending state is kept.
    FunctionCall,
}

impl FromStr for ConfirmationProtocol {
    type Err = AssistantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirm" => Ok(Self::Confirm),
            "function-call" | "function_call" => Ok(Self::FunctionCall),
            other => Err(AssistantError::Config(format!(
                "ASSISTANT_PROTOCOL must be `confirm` or `function-call`, got `{other}`"
            ))),
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct AssistantConfig {
    pub google_api_key: String,
    pub google_model: String,
    pub google_base_url: Option<String>,
    /// Documentation embedded in every prompt. Read on each request.
    pub context_path: PathBuf,
    /// Working copy that generated features are committed into.
    pub repo_path: PathBuf,
    pub git_remote: String,
    pub protocol: ConfirmationProtocol,
    pub port: u16,
    /// Upper bound on a single language model request.
    pub request_timeout: Duration,
    /// Upper bound on a single git invocation.
    pub git_timeout: Duration,
}

impl AssistantConfig {
    /// Load the configuration from the process environment, after applying a
    /// `.env` file if one exists.
    pub fn from_env() -> Result<Self, AssistantError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AssistantError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let google_api_key = get("GOOGLE_API_KEY")
            .ok_or_else(|| AssistantError::Config("GOOGLE_API_KEY is not set".to_string()))?;

        let protocol = get("ASSISTANT_PROTOCOL")
            .map(|value| value.parse::<ConfirmationProtocol>())
            .transpose()?
            .unwrap_or_default();

        let port = get("PORT")
            .map(|value| parse_number::<u16>("PORT", &value))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let timeout_secs = get("REQUEST_TIMEOUT_SECS")
            .map(|value| parse_number::<u64>("REQUEST_TIMEOUT_SECS", &value))
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let git_timeout_secs = get("GIT_TIMEOUT_SECS")
            .map(|value| parse_number::<u64>("GIT_TIMEOUT_SECS", &value))
            .transpose()?
            .unwrap_or(DEFAULT_GIT_TIMEOUT_SECS);

        Ok(Self {
            google_api_key,
            google_model: get("GOOGLE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            google_base_url: get("GOOGLE_BASE_URL"),
            context_path: get("CONTEXT_PATH")
                .unwrap_or_else(|| DEFAULT_CONTEXT_PATH.to_string())
                .into(),
            repo_path: get("REPO_PATH")
                .unwrap_or_else(|| DEFAULT_REPO_PATH.to_string())
                .into(),
            git_remote: get("GIT_REMOTE").unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            protocol,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            git_timeout: Duration::from_secs(git_timeout_secs),
        })
    }

    /// The Gemini model described by this configuration, with the request
    /// timeout applied to its HTTP client.
    pub fn language_model(&self) -> Result<GoogleModel, AssistantError> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|error| {
                AssistantError::Config(format!("failed to build HTTP client: {error}"))
            })?;

        Ok(GoogleModel::new(
            self.google_model.clone(),
            GoogleModelOptions {
                api_key: self.google_api_key.clone(),
                base_url: self.google_base_url.clone(),
                client: Some(client),
            },
        ))
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("google_api_key", &"<redacted>")
            .field("google_model", &self.google_model)
            .field("google_base_url", &self.google_base_url)
            .field("context_path", &self.context_path)
            .field("repo_path", &self.repo_path)
            .field("git_remote", &self.git_remote)
            .field("protocol", &self.protocol)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("git_timeout", &self.git_timeout)
            .finish()
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, AssistantError> {
    value
        .trim()
        .parse()
        .map_err(|_| AssistantError::Config(format!("{key} must be a number, got `{value}`")))
}
