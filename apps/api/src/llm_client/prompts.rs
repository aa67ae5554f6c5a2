// Prompt templates for every LLM-backed operation.
// Placeholders in `{braces}` are substituted with `fill_template` before sending.

/// Default system prompt for free-text answers.
pub const ASSISTANT_SYSTEM: &str = "You are a helpful assistant.";

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Replace `{cv_text}`.
pub const SUMMARIZE_CV_PROMPT: &str = "Summarize this CV:\n{cv_text}";

/// Replace `{cv_summary}` and `{job_description}`.
pub const MATCH_REASONING_PROMPT: &str = "Given this CV:\n{cv_summary}\n\
    And this job:\n{job_description}\n\
    Why is this a good match and what can be improved?";

/// Replace `{job_description}` and `{cv_summary}`.
pub const TAILOR_CV_PROMPT: &str = "Tailor this CV for the job below:\n\
    Job: {job_description}\n\
    CV:\n{cv_summary}";

/// Replace `{cv_summary}`. Answer must match `CvQualityReport`.
pub const CV_QUALITY_PROMPT: &str = r#"Score this CV out of 100 and explain how it can be improved.

Return a JSON object with this EXACT schema (no extra fields):
{
  "score": 78,
  "feedback": "Two or three short paragraphs of concrete improvement advice."
}

"score" is an integer from 0 to 100.

CV:
{cv_summary}"#;

/// Replace `{feedback}` and `{cv_text}`.
pub const IMPROVE_CV_PROMPT: &str = "Rewrite and improve this CV based on the following feedback:\n\
    {feedback}\n\
    Original CV:\n{cv_text}";

/// Replace `{question}` and `{cv_summary}`.
pub const CAREER_QA_PROMPT: &str = "Q: {question}\nContext:\n{cv_summary}";

/// Substitutes `{name}` placeholders in one left-to-right pass. Inserted values are
/// never rescanned, so user text containing `{cv_summary}` stays literal. Braces that
/// do not name a known placeholder (the JSON schema examples) are kept as-is.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let substitution = after.find('}').and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, end))
        });
        match substitution {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
