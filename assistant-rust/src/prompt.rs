use crate::ConversationTurn;

/// Fixed instructions placed at the top of every prompt.
pub const ASSISTANT_PREAMBLE: &str = "\
You are a feature creation assistant for a data platform.
Base your response on the documentation provided below.
Assume the database is using the TPCH schema, so some of the entities are:
Order, Customer, Line Item.
If you have enough information to generate the YAML, do so in a single ```yaml fenced block \
whose first line is a comment naming the file (for example `# customer_order_count.yml`), \
and **ask the user** if they want to commit it to Git.
If more details are needed, ask follow-up questions.";

/// Assemble the prompt for one request: preamble, documentation, prior turns
/// (one `<role>: <content>` line each, oldest first), then the current message.
///
/// Nothing is trimmed or truncated; callers are responsible for staying within
/// the model's input limit.
#[must_use]
pub fn build_prompt(documentation: &str, history: &[ConversationTurn], message: &str) -> String {
    let conversation_history = history
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{ASSISTANT_PREAMBLE}\n\n\
         Documentation:\n{documentation}\n\n\
         Previous conversation:\n{conversation_history}\n\n\
         User query: {message}\n"
    )
}
