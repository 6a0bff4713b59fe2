use crate::{
    AssistantMessage, Message, ModelResponse, Part, TextPart, ToolCallPart, UserMessage,
};

impl TextPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ToolCallPart {
    pub fn new(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        args: serde_json::Value,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args,
        }
    }
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart::new(text))
    }

    pub fn tool_call(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        args: serde_json::Value,
    ) -> Self {
        Self::ToolCall(ToolCallPart::new(tool_call_id, tool_name, args))
    }
}

impl Message {
    pub fn user(content: Vec<Part>) -> Self {
        Self::User(UserMessage { content })
    }

    pub fn assistant(content: Vec<Part>) -> Self {
        Self::Assistant(AssistantMessage { content })
    }
}

impl ModelResponse {
    /// Concatenated text of every text part, in order. Empty when the model
    /// returned no text.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                Part::Text(text_part) => Some(text_part.text.as_str()),
                Part::ToolCall(_) => None,
            })
            .collect()
    }

    /// The first tool call in the response, if any.
    #[must_use]
    pub fn first_tool_call(&self) -> Option<&ToolCallPart> {
        self.content.iter().find_map(|part| match part {
            Part::ToolCall(tool_call) => Some(tool_call),
            Part::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_joins_text_parts_and_skips_tool_calls() {
        let response = ModelResponse {
            content: vec![
                Part::text("Here is "),
                Part::tool_call("call_1", "noop", json!({})),
                Part::text("the feature."),
            ],
            ..Default::default()
        };

        assert_eq!(response.text(), "Here is the feature.");
    }

    #[test]
    fn text_is_empty_without_text_parts() {
        assert_eq!(ModelResponse::default().text(), "");
    }

    #[test]
    fn first_tool_call_returns_earliest_call() {
        let response = ModelResponse {
            content: vec![
                Part::text("calling"),
                Part::tool_call("a", "first", json!({ "x": 1 })),
                Part::tool_call("b", "second", json!({})),
            ],
            ..Default::default()
        };

        let call = response.first_tool_call().expect("tool call present");
        assert_eq!(call.tool_name, "first");
        assert_eq!(call.args, json!({ "x": 1 }));
    }
}
