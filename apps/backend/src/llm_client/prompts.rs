// Shared prompt fragments. Gemini's generateContent takes no separate system
// prompt in our requests, so these are prepended to the user prompt.

/// Enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Forbids inventing experience the candidate does not have.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Only use facts present in the resume. Do NOT invent employers, \
    dates, degrees, certifications or metrics. If the resume does not support a \
    claim, leave it out and list the skill as missing instead.";

/// Prefixes a prompt with the JSON-only instruction.
pub fn json_prompt(body: &str) -> String {
    format!("{JSON_ONLY_INSTRUCTION}\n\n{body}")
}

/// Fills `{name}` placeholders in a single pass. Substituted values are not
/// re-scanned, and braces that do not name a variable are left untouched.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after.find('}').and_then(|end| {
            let name = &after[..end];
            vars.iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| (*v, end))
        });
        match value {
            Some((v, end)) => {
                out.push_str(v);
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
