use super::api::{
    Content, FunctionCall, FunctionDeclaration, GenerateContentParameters,
    GenerateContentResponse, Part as GooglePart, Tool, UsageMetadata,
};
use crate::{
    client_utils, id_utils, tracing_utils, LanguageModel, LanguageModelError,
    LanguageModelInput, LanguageModelResult, Message, ModelResponse, ModelUsage, Part,
    ToolCallPart,
};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde_json::json;

const PROVIDER: &str = "google";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GoogleModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Clone, Default)]
pub struct GoogleModelOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    /// A preconfigured client, e.g. one carrying a request timeout.
    pub client: Option<Client>,
}

impl GoogleModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleModelOptions) -> Self {
        let GoogleModelOptions {
            api_key,
            base_url,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client: client.unwrap_or_default(),
        }
    }

    /// The API key travels in a header so it never appears in request URLs,
    /// and therefore never in transport error messages.
    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut api_key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            LanguageModelError::InvalidInput(
                "Google API key is not a valid header value".to_string(),
            )
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for GoogleModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        tracing_utils::trace_generate(PROVIDER, &self.model_id, input, |input| async move {
            let params = convert_to_generate_content_parameters(input);

            let url = format!("{}/models/{}:generateContent", self.base_url, self.model_id);

            let response: GenerateContentResponse =
                client_utils::send_json(&self.client, &url, &params, self.request_headers()?)
                    .await?;

            let candidate = response
                .candidates
                .and_then(|c| c.into_iter().next())
                .ok_or_else(|| {
                    LanguageModelError::Invariant(PROVIDER, "No candidate in response".to_string())
                })?;

            let content =
                map_google_content(candidate.content.and_then(|c| c.parts).unwrap_or_default())?;

            Ok(ModelResponse {
                content,
                usage: response.usage_metadata.as_ref().map(map_google_usage),
            })
        })
        .await
    }
}

fn convert_to_generate_content_parameters(input: LanguageModelInput) -> GenerateContentParameters {
    let LanguageModelInput { messages, tools } = input;

    let tools = tools.map(|tools| {
        vec![Tool {
            function_declarations: Some(
                tools
                    .into_iter()
                    .map(|tool| FunctionDeclaration {
                        name: Some(tool.name),
                        description: Some(tool.description),
                        parameters_json_schema: Some(tool.parameters),
                    })
                    .collect(),
            ),
        }]
    });

    GenerateContentParameters {
        contents: messages.into_iter().map(convert_to_google_content).collect(),
        tools,
    }
}

fn convert_to_google_content(message: Message) -> Content {
    let (role, parts) = match message {
        Message::User(user_message) => ("user", user_message.content),
        Message::Assistant(assistant_message) => ("model", assistant_message.content),
    };

    Content {
        role: Some(role.to_string()),
        parts: Some(parts.into_iter().map(convert_to_google_part).collect()),
    }
}

fn convert_to_google_part(part: Part) -> GooglePart {
    match part {
        Part::Text(text_part) => GooglePart {
            text: Some(text_part.text),
            ..Default::default()
        },
        Part::ToolCall(tool_call_part) => GooglePart {
            function_call: Some(FunctionCall {
                id: Some(tool_call_part.tool_call_id),
                name: Some(tool_call_part.tool_name),
                args: Some(tool_call_part.args),
            }),
            ..Default::default()
        },
    }
}

fn map_google_content(parts: Vec<GooglePart>) -> LanguageModelResult<Vec<Part>> {
    parts
        .into_iter()
        .filter_map(|part| {
            if let Some(function_call) = part.function_call {
                let Some(name) = function_call.name else {
                    return Some(Err(LanguageModelError::Invariant(
                        PROVIDER,
                        "Function call missing name".to_string(),
                    )));
                };
                Some(Ok(Part::ToolCall(ToolCallPart {
                    // Google does not always return id, generate one if missing
                    tool_call_id: function_call
                        .id
                        .unwrap_or_else(|| id_utils::generate_string(10)),
                    tool_name: name,
                    args: function_call.args.unwrap_or_else(|| json!({})),
                })))
            } else if part.thought.unwrap_or(false) {
                // Thought summaries are not part of the answer.
                None
            } else {
                part.text.map(|text| Ok(Part::text(text)))
            }
        })
        .collect()
}

fn map_google_usage(usage: &UsageMetadata) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0),
    }
}
