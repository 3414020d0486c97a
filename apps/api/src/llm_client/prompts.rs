// Shared prompt constants.
// Task prompts live in intelligence::prompts; this file holds cross-cutting fragments.

/// System prompt sent with every completion.
pub const RESUME_EXPERT_SYSTEM: &str = "You are an expert resume analyzer and career coach \
    with 10+ years of experience in HR and recruitment.";

/// Appended to every prompt that expects a structured reply.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single JSON object only. \
    Do NOT include explanations or apologies outside the JSON object.";
