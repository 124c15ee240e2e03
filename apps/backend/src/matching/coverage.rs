//! Keyword coverage: measures how well a résumé covers a job's keywords.
//!
//! Deterministic and local: the keywords themselves come from the LLM, the
//! scoring does not.
//!
//! Algorithm:
//! 1. For each keyword:
//!    - whole-term match in the résumé → strength 1.0
//!    - every token of a multi-word keyword present → strength 0.6
//!    - otherwise → strength 0.0
//! 2. score = Σ strength / n × 100, rounded
//! 3. Classify: strong (≥0.8), partial (0.4–0.79), missing (<0.4)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordMatch {
    pub keyword: String,
    pub strength: f32, // 0.0 – 1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub score: u32, // 0 – 100
    pub strong_matches: Vec<KeywordMatch>,
    pub partial_matches: Vec<KeywordMatch>,
    pub missing_keywords: Vec<String>,
    pub recommendation: String,
}

pub fn keyword_coverage(resume_text: &str, keywords: &[String]) -> CoverageReport {
    let keywords = dedup_keywords(keywords);

    if keywords.is_empty() {
        return CoverageReport {
            score: 0,
            strong_matches: vec![],
            partial_matches: vec![],
            missing_keywords: vec![],
            recommendation: "No keywords found in the job description; cannot score coverage."
                .to_string(),
        };
    }

    let resume_lower = resume_text.to_lowercase();
    let resume_tokens = tokenize(&resume_lower);

    let mut strong_matches = Vec::new();
    let mut partial_matches = Vec::new();
    let mut missing_keywords = Vec::new();
    let mut total = 0.0_f32;

    for keyword in &keywords {
        let strength = keyword_strength(&resume_lower, &resume_tokens, keyword);
        total += strength;

        let km = KeywordMatch {
            keyword: keyword.clone(),
            strength,
        };
        if strength >= 0.8 {
            strong_matches.push(km);
        } else if strength >= 0.4 {
            partial_matches.push(km);
        } else {
            missing_keywords.push(keyword.clone());
        }
    }

    let score = ((total / keywords.len() as f32) * 100.0).round() as u32;
    let recommendation = build_recommendation(score, &missing_keywords);

    CoverageReport {
        score,
        strong_matches,
        partial_matches,
        missing_keywords,
        recommendation,
    }
}

fn keyword_strength(resume_lower: &str, resume_tokens: &[&str], keyword: &str) -> f32 {
    let keyword_lower = keyword.to_lowercase();
    if contains_term(resume_lower, &keyword_lower) {
        return 1.0;
    }

    let parts = tokenize(&keyword_lower);
    if parts.len() > 1 && parts.iter().all(|p| resume_tokens.contains(p)) {
        return 0.6;
    }
    0.0
}

/// Substring match bounded by non-alphanumeric characters, so "java" does not
/// match inside "javascript" but "node.js" matches "Node.js,".
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Splits on anything that is not alphanumeric or one of `+#.` (for c++, c#, node.js).
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Trims, drops blanks and case-insensitive duplicates, keeps first-seen order.
fn dedup_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .map(String::from)
        .collect()
}

/// Builds a human-readable recommendation string from score and gaps.
fn build_recommendation(score: u32, missing: &[String]) -> String {
    let top_gaps: Vec<&str> = missing.iter().take(5).map(String::as_str).collect();

    if score >= 80 {
        "Strong keyword coverage. Your résumé already mentions most of the job's key terms."
            .to_string()
    } else if score >= 50 {
        format!(
            "Moderate coverage ({score}/100). Work these keywords in where your experience supports them: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low coverage ({score}/100). Missing keywords: {}. ATS filters are likely to rank this résumé low for the role.",
            top_gaps.join(", ")
        )
    }
}
