//! Transcript rendering for the single-prompt generate endpoint.

use crate::Message;

/// Render `[ROLE] text` lines for every context message, then the new
/// utterance as a final `[USER]` line.
pub fn build_transcript(context: &[Message], prompt: &str) -> String {
    let mut out = String::new();
    for msg in context {
        push_line(&mut out, msg.role.as_str(), &msg.text);
    }
    push_line(&mut out, "user", prompt);
    out
}

fn push_line(out: &mut String, role: &str, text: &str) {
    out.push('[');
    out.push_str(&role.to_uppercase());
    out.push_str("] ");
    out.push_str(text);
    out.push('\n');
}
