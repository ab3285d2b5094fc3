use crate::message::Message;
use crate::passage::Passage;
use serde::{Deserialize, Serialize};

/// Per-request state threaded through the pipeline stages.
///
/// Constructed at the start of `invoke`, discarded once the answer has been
/// persisted. `question` keeps what the user actually asked; retrieval always
/// uses it, while `working_question` may be rewritten by the contextualizer
/// and is only ever handed to the answer generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagState {
    pub question: String,
    pub working_question: String,
    pub context: Vec<Passage>,
    pub chat_history: Vec<Message>,
    pub answer: String,
}

impl RagState {
    pub fn new(question: impl Into<String>, chat_history: Vec<Message>) -> Self {
        let question = question.into();
        Self {
            working_question: question.clone(),
            question,
            context: Vec::new(),
            chat_history,
            answer: String::new(),
        }
    }
}

/// Result of one completed pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagOutput {
    pub answer: String,
    pub thread_id: String,
    /// Id of the persisted assistant message
    pub message_id: String,
}
