// Cross-cutting prompt fragments shared by every semantic extraction call.
// Task-specific templates live in research/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps the model from inventing evidence the inputs do not contain.
pub const EVIDENCE_INSTRUCTION: &str = "\
    Base every statement strictly on the material provided. \
    If a field cannot be supported by that material, return an empty value for it \
    instead of guessing.";
