//! Instruction templates for the risk analysis call.

pub const SYSTEM_PROMPT: &str =
    "You are an expert Patent Attorney. Always respond with valid JSON.";

/// Fixed advisory returned when the model output cannot be parsed.
pub const FALLBACK_RECOMMENDATION: &str =
    "Please consult with a patent attorney for detailed analysis.";

/// Renders the full user message: the invention idea plus the formatted
/// prior-art block, wrapped in the fixed task instructions that pin the
/// output schema and the allowed risk_level values.
pub fn render_analysis_prompt(user_idea: &str, retrieved_patents: &str) -> String {
    format!(
        r#"You are an expert Patent Attorney with deep knowledge of intellectual property law and prior art analysis.

USER'S INVENTION IDEA:
{user_idea}

RETRIEVED PRIOR ART (Top 5 Most Similar Patents):
{retrieved_patents}

TASK:
1. Analyze the user's invention idea against each of the retrieved patents.
2. Identify potential conflicts, overlapping claims, or areas of novelty.
3. Assign a RISK LEVEL: High, Medium, or Low
   - HIGH: Strong overlap with existing patents, likely infringement concerns
   - MEDIUM: Some similarities but with distinguishable features
   - LOW: Mostly novel with minimal prior art conflicts

4. Provide a clear, concise analysis (2-3 paragraphs) explaining:
   - Which patents pose the greatest risk and why
   - What aspects of the invention appear novel
   - Recommendations for the inventor

CRITICAL: You MUST respond with ONLY valid JSON. Do NOT wrap your response in markdown code blocks or backticks.
Do NOT include ```json or ``` in your response.

FORMAT YOUR RESPONSE EXACTLY LIKE THIS (raw JSON only):
{{
  "risk_level": "High",
  "analysis": "Your detailed analysis here...",
  "conflicting_patents": ["US-123456-A1", "US-789012-A1"],
  "recommendations": "Brief recommendations for the inventor"
}}

IMPORTANT RULES:
- risk_level must be exactly one of: "High", "Medium", or "Low" (capitalize first letter)
- Start your response with {{ and end with }}
- No markdown formatting, no code blocks, no backticks
- Be professional, precise, and helpful. Focus on actionable insights."#
    )
}
