//! Prompts for the stage-2 AI re-rank.

/// System prompt for job relevance scoring.
pub const JOB_RELEVANCE_SYSTEM: &str = "You are an expert technical recruiter. \
    You evaluate how well a candidate's CV matches a specific job description. \
    You MUST respond with valid JSON only, no markdown fences, no extra text.";

/// Prompt template for scoring one (CV, job description) pair.
/// Placeholders: `{cv_text}`, `{job_description}`.
pub const JOB_RELEVANCE_PROMPT_TEMPLATE: &str = r#"Rate how well this CV matches the job description below.

CV:
{cv_text}

JOB DESCRIPTION:
{job_description}

Respond with exactly this JSON shape:
{"score": <integer 1-100>, "reason": "<one sentence explaining the score>"}

The score must be a strict integer between 1 and 100. The reason must be a single sentence."#;
