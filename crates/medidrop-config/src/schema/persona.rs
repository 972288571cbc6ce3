//! Bot persona: the system entry and canned assistant messages.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly and empathetic customer support chatbot. \
Your main purpose is to guide customers who want to throw away unused or expired medicine toward safe \
disposal, and to summarize their complaints precisely so a staff member can follow up.
Answer politely and with empathy. Organize what the customer tells you as What / When / Where / How, \
and ask for an email address so a staff member can reply after reviewing it. If the customer does not \
want to share contact details, politely explain: \"We are sorry, but without contact details you will \
not be able to receive the staff member's review.\"";

pub const DEFAULT_RATE_LIMIT_APOLOGY: &str = "The service is temporarily busy. We kept only the most \
recent part of our conversation and will continue from there. We apologize for the inconvenience.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Instructions sent as the system entry of every conversation.
    pub system_prompt: String,
    /// Assistant message appended after rate-limit exhaustion.
    pub rate_limit_apology: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            rate_limit_apology: DEFAULT_RATE_LIMIT_APOLOGY.into(),
        }
    }
}
