use serde::Serialize;

use crate::retrieve_chunks::Hit;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Context mode: persona plus retrieved passages go in the system message,
/// the question alone is the user turn.
pub fn build_prompt_with_context(system_prompt: &str, question: &str, hits: &[Hit]) -> Vec<Message> {
    let context = format_context_from_hits(hits);
    let system = format!(
        "{}\n\nContext information is below.\n--------------------\n{}\n--------------------\n\
         Use the context above to answer the user's question.",
        system_prompt, context
    );
    vec![Message::system(system), Message::user(question)]
}

pub fn format_context_from_hits(hits: &[Hit]) -> String {
    let mut context_lines = Vec::new();
    for (i, hit) in hits.iter().enumerate() {
        let chunk = &hit.chunk;
        context_lines.push(format!(
            "[{}] {} (chunk {})\n{}",
            i + 1,
            chunk.source,
            chunk.position,
            chunk.text
        ));
    }

    if context_lines.is_empty() {
        "(no context found)".to_string()
    } else {
        context_lines.join("\n\n")
    }
}
