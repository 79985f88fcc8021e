// Shared prompt constants and prompt-building utilities.
// Each capability defines its own templates in interview/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appends the JSON-only rule and the expected output shape to a system prompt.
pub fn with_output_shape(system: &str, shape: &str) -> String {
    format!(
        "{system}\n\n{JSON_ONLY_SYSTEM}\n\nReturn a JSON object with this EXACT schema (no extra fields):\n{shape}"
    )
}
