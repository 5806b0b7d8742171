// Cross-cutting prompt fragments shared by every stage worker.
// Stage-specific text lives in stages::prompts.

/// Appended to a stage prompt whose expected output is JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Your final answer MUST be valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Appended to the system prompt when the worker has tools bound.
pub const TOOL_USE_INSTRUCTION: &str = "\
    You may call the available tools to gather facts before answering. \
    Only state facts you found in tool results or in the provided context. \
    When you have what you need, stop calling tools and give your final answer.";

/// Appended to every system prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Do NOT invent employers, dates, degrees, metrics or skills. \
    If the inputs do not support a claim, omit it.";
