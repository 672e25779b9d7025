// Shared prompt fragments. Each service that needs oracle calls keeps its own
// prompts.rs alongside it; this file holds only cross-cutting pieces.

/// Appended to every system prompt that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT wrap the answer in LaTeX such as \\boxed{}. \
    Do NOT include explanations or apologies.";
