//! Persona templating and reply post-processing.

use crate::models::identity::DisplayNames;

pub const AI_NAME_PLACEHOLDER: &str = "{{AI_NAME}}";
pub const DEV_NAME_PLACEHOLDER: &str = "{{DEV_NAME}}";

/// Returned instead of a reply while maintenance mode is on.
pub const MAINTENANCE_NOTICE: &str = "SYSTEM: SERVER UNDER MAINTENANCE.";

/// Appended to every system prompt so code comes back as fenced markdown.
pub const CODING_INSTRUCTION: &str = "\nIF ASKED FOR CODE, ANSWER ONLY WITH VALID CODE IN A MARKDOWN ```language ... ``` BLOCK SO IT CAN BE SEPARATED.";

pub const CODE_FENCE: &str = "```";

/// Language tag stored for replies containing a fenced block.
/// Not detected from the content.
pub const CODE_LANGUAGE: &str = "javascript";

pub const PLAIN_LANGUAGE: &str = "text";

/// Substitute every placeholder occurrence with the session's names.
#[must_use]
pub fn render_persona(template: &str, names: &DisplayNames) -> String {
    template
        .replace(AI_NAME_PLACEHOLDER, &names.ai_name)
        .replace(DEV_NAME_PLACEHOLDER, &names.dev_name)
}

/// Rendered persona followed by the coding instruction.
#[must_use]
pub fn build_system_prompt(template: Option<&str>, names: &DisplayNames) -> String {
    let mut prompt = render_persona(template.unwrap_or_default(), names);
    prompt.push_str(CODING_INSTRUCTION);
    prompt
}

/// Whether a reply should be rendered as code, and the tag to store with it.
#[must_use]
pub fn detect_code(reply: &str) -> (bool, &'static str) {
    if reply.contains(CODE_FENCE) {
        (true, CODE_LANGUAGE)
    } else {
        (false, PLAIN_LANGUAGE)
    }
}
