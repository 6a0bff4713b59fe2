use crate::ConfirmationProtocol;
use assistant_llm::{
    LanguageModel, LanguageModelInput, LanguageModelResult, Message, ModelResponse, Part, Tool,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the capability the model may call to persist a feature.
pub const COMMIT_TOOL_NAME: &str = "commit_and_push_yaml";

/// What the model produced for one prompt, decoded once at this boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayReply {
    /// Free-form reply text. Empty when the model returned no text parts.
    Text(String),
    /// A call to a capability this gateway declared.
    StructuredCall { name: String, args: Value },
}

/// The `commit_and_push_yaml` declaration offered to the model.
#[must_use]
pub fn commit_tool() -> Tool {
    Tool {
        name: COMMIT_TOOL_NAME.to_string(),
        description: "Commits the generated YAML to the Git repository and pushes it to the remote."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "The name of the YAML file to save."
                },
                "content": {
                    "type": "string",
                    "description": "The YAML content to save."
                }
            },
            "required": ["filename", "content"]
        }),
    }
}

/// Warning shown to the user when the model calls something we never offered.
#[must_use]
pub fn unknown_capability_warning(name: &str) -> String {
    format!("⚠️ The assistant suggested an unknown function: {name}")
}

/// Sends composed prompts to the generative model.
pub struct AssistantGateway {
    model: Arc<dyn LanguageModel>,
    protocol: ConfirmationProtocol,
}

impl AssistantGateway {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, protocol: ConfirmationProtocol) -> Self {
        Self { model, protocol }
    }

    /// Tools declared to the model under the active protocol.
    fn tools(&self) -> Option<Vec<Tool>> {
        match self.protocol {
            ConfirmationProtocol::Confirm => None,
            ConfirmationProtocol::FunctionCall => Some(vec![commit_tool()]),
        }
    }

    /// Send `prompt` as a single user message and decode the reply.
    ///
    /// A call to an undeclared capability is not an error: it comes back as a
    /// [`GatewayReply::Text`] warning naming the capability.
    pub async fn ask(&self, prompt: String) -> LanguageModelResult<GatewayReply> {
        debug!(
            provider = self.model.provider(),
            model = %self.model.model_id(),
            prompt_len = prompt.len(),
            "sending prompt"
        );

        let tools = self.tools();
        let response = self
            .model
            .generate(LanguageModelInput {
                messages: vec![Message::user(vec![Part::text(prompt)])],
                tools: tools.clone(),
                ..Default::default()
            })
            .await?;

        Ok(decode_reply(response, tools.as_deref().unwrap_or_default()))
    }
}

fn decode_reply(response: ModelResponse, declared: &[Tool]) -> GatewayReply {
    let Some(call) = response.first_tool_call() else {
        return GatewayReply::Text(response.text());
    };

    if declared.iter().any(|tool| tool.name == call.tool_name) {
        GatewayReply::StructuredCall {
            name: call.tool_name.clone(),
            args: call.args.clone(),
        }
    } else {
        warn!(capability = %call.tool_name, "model called an unknown capability");
        GatewayReply::Text(unknown_capability_warning(&call.tool_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_llm::mock::{MockGenerateResult, MockLanguageModel};

    fn gateway(protocol: ConfirmationProtocol) -> (Arc<MockLanguageModel>, AssistantGateway) {
        let model = Arc::new(MockLanguageModel::new());
        let gateway = AssistantGateway::new(model.clone(), protocol);
        (model, gateway)
    }

    #[tokio::test]
    async fn sends_prompt_as_single_user_message_without_tools() {
        let (model, gateway) = gateway(ConfirmationProtocol::Confirm);
        model.enqueue_generate(MockGenerateResult::text("Which entity?"));

        let reply = gateway.ask("the prompt".to_string()).await.expect("reply");

        assert_eq!(reply, GatewayReply::Text("Which entity?".to_string()));
        assert_eq!(
            model.tracked_generate_inputs(),
            vec![LanguageModelInput {
                messages: vec![Message::user(vec![Part::text("the prompt")])],
                ..Default::default()
            }]
        );
    }

    #[tokio::test]
    async fn declares_commit_tool_in_function_call_protocol() {
        let (model, gateway) = gateway(ConfirmationProtocol::FunctionCall);
        model.enqueue_generate(ModelResponse {
            content: vec![Part::tool_call(
                "call_1",
                COMMIT_TOOL_NAME,
                json!({ "filename": "orders.yml", "content": "name: orders\n" }),
            )],
            ..Default::default()
        });

        let reply = gateway.ask("prompt".to_string()).await.expect("reply");

        assert_eq!(
            reply,
            GatewayReply::StructuredCall {
                name: COMMIT_TOOL_NAME.to_string(),
                args: json!({ "filename": "orders.yml", "content": "name: orders\n" }),
            }
        );
        let inputs = model.tracked_generate_inputs();
        assert_eq!(inputs[0].tools, Some(vec![commit_tool()]));
    }

    #[tokio::test]
    async fn unknown_capability_becomes_warning_text() {
        let (model, gateway) = gateway(ConfirmationProtocol::FunctionCall);
        model.enqueue_generate(ModelResponse {
            content: vec![Part::tool_call("call_1", "delete_repository", json!({}))],
            ..Default::default()
        });

        let reply = gateway.ask("prompt".to_string()).await.expect("reply");

        assert_eq!(
            reply,
            GatewayReply::Text(
                "⚠️ The assistant suggested an unknown function: delete_repository".to_string()
            )
        );
    }

    #[tokio::test]
    async fn undeclared_commit_call_is_unknown_in_confirm_protocol() {
        let (model, gateway) = gateway(ConfirmationProtocol::Confirm);
        model.enqueue_generate(ModelResponse {
            content: vec![Part::tool_call("call_1", COMMIT_TOOL_NAME, json!({}))],
            ..Default::default()
        });

        let reply = gateway.ask("prompt".to_string()).await.expect("reply");

        assert_eq!(
            reply,
            GatewayReply::Text(unknown_capability_warning(COMMIT_TOOL_NAME))
        );
    }

    #[tokio::test]
    async fn empty_reply_degrades_to_empty_text() {
        let (model, gateway) = gateway(ConfirmationProtocol::Confirm);
        model.enqueue_generate(ModelResponse::default());

        let reply = gateway.ask("prompt".to_string()).await.expect("reply");

        assert_eq!(reply, GatewayReply::Text(String::new()));
    }
}
