#![allow(dead_code)]

// Shared prompt constants. Each service that needs LLM calls defines its own
// prompts alongside it; this file contains cross-cutting fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
