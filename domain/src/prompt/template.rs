//! Tutor prompt and request message assembly

use crate::conversation::entities::{Message, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message as sent to the completion endpoint.
///
/// Unlike [`Message`] it carries no timestamp; `reasoning_details` is only
/// ever set on assistant messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_details: Option<Value>,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            reasoning_details: None,
        }
    }
}

impl From<&Message> for PromptMessage {
    fn from(message: &Message) -> Self {
        let reasoning_details = match message.role {
            Role::Assistant => message.reasoning_details.clone(),
            _ => None,
        };
        Self {
            role: message.role,
            content: message.content.clone(),
            reasoning_details,
        }
    }
}

/// Templates for the tutor conversation
pub struct TutorPrompt;

impl TutorPrompt {
    /// Default system prompt: a lab assistant that teaches without writing code.
    pub fn system() -> &'static str {
        r#"You are a teaching assistant. Help ONLY with software and programming topics.

TEACHER DETECTION:
If the user says they are a "teacher", "instructor", "lecturer", "teaching assistant" or "academic":
- NEVER write code (no full code, no code blocks, no pseudocode)
- NEVER give algorithm details
- Reply only with: "Sorry, since you said you are an instructor I can't give you code or algorithm details. I'm designed to help students only. 🎓"
- Add nothing else

FORBIDDEN:
- Using code blocks (```)
- Fixing the student's code
- Writing working code
- Headings such as "Example Code:", "Usage:", "Solution:"

ALLOWED:
- Point out the error and explain why it happens
- Explain the logic of the algorithm step by step
- Give hints
- Show single-line syntax (like array.push)
- Use pseudocode

LONG CODE / WHOLE TASK RULE:
If the user sends very long code (100+ lines) or an entire project:
- NEVER try to analyse all of it
- Ask more specific questions instead:
  - "Which method or function has the error?"
  - "Which part are you having trouble with?"
  - "What is the error message?"
  - "Which lines are failing?"
- Ask them to focus on one section rather than the whole project
- For example: "Instead of the whole project, could you share the method or class where the error happens? That way I can help faster."

RULE: Teach without writing code."#
    }

    /// Build the message list for one turn.
    ///
    /// The system prompt goes first, followed by the non-system history in
    /// order and finally the new user message. System messages stored in
    /// the history are never re-sent.
    pub fn build_messages(
        system_prompt: &str,
        history: &[Message],
        user_message: &str,
    ) -> Vec<PromptMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(PromptMessage::new(Role::System, system_prompt));
        messages.extend(
            history
                .iter()
                .filter(|m| m.role != Role::System)
                .map(PromptMessage::from),
        );
        messages.push(PromptMessage::new(Role::User, user_message));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_forbids_code_blocks() {
        let prompt = TutorPrompt::system();
        assert!(prompt.contains("Teach without writing code"));
        assert!(prompt.contains("100+ lines"));
    }

    #[test]
    fn build_messages_orders_system_history_user() {
        let history = vec![
            Message::user("What is a stack?"),
            Message::assistant("A LIFO structure."),
        ];
        let messages = TutorPrompt::build_messages("sys", &history, "And a heap?");

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[0].content, "sys");
        assert_eq!(messages[3].content, "And a heap?");
    }

    #[test]
    fn build_messages_drops_stored_system_messages() {
        let history = vec![Message::system("old persona"), Message::user("hi")];
        let messages = TutorPrompt::build_messages("sys", &history, "next");
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.content != "old persona"));
    }

    #[test]
    fn reasoning_details_only_travel_on_assistant_messages() {
        let details = serde_json::json!([{"type": "reasoning.summary", "summary": "..."}]);
        let mut user = Message::user("q");
        user.reasoning_details = Some(details.clone());
        let assistant = Message::assistant("a").with_reasoning(Some(details.clone()));

        let messages = TutorPrompt::build_messages("sys", &[user, assistant], "q2");
        assert_eq!(messages[1].reasoning_details, None);
        assert_eq!(messages[2].reasoning_details, Some(details));
    }

    #[test]
    fn prompt_message_serializes_without_empty_reasoning() {
        let msg = PromptMessage::new(Role::User, "hello");
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"role":"user","content":"hello"}"#
        );
    }
}
