//! Deterministic ATS formatting checks on extracted résumé text.
//!
//! These only look at the flattened text, so layout problems that survive
//! extraction (missing headings, no bullets, no contact line) are what they
//! can catch.

use serde::Serialize;

const MIN_WORDS: usize = 150;
const MAX_WORDS: usize = 1000;
const BULLET_MARKERS: [char; 6] = ['•', '-', '*', '▪', '◦', '●'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtsTip {
    pub check: &'static str,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtsReport {
    pub checks_passed: u32,
    pub checks_total: u32,
    pub tips: Vec<AtsTip>,
}

/// Heading aliases per standard section. Any alias satisfies the section.
const SECTIONS: [(&str, &[&str]); 3] = [
    (
        "experience",
        &["experience", "employment", "work history", "professional experience"],
    ),
    ("education", &["education", "academic background"]),
    ("skills", &["skills", "technical skills", "core competencies"]),
];

pub fn ats_checks(resume_text: &str) -> AtsReport {
    let lines: Vec<&str> = resume_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut tips = Vec::new();
    let mut total = 0;

    for (section, aliases) in SECTIONS {
        total += 1;
        if !lines.iter().any(|l| is_heading(l, aliases)) {
            tips.push(AtsTip {
                check: "section_headings",
                severity: Severity::Critical,
                message: format!(
                    "No '{section}' heading found. Use a standard heading such as '{}' so ATS parsers can map the section.",
                    aliases[0].to_uppercase()
                ),
            });
        }
    }

    total += 1;
    if !resume_text.split_whitespace().any(looks_like_email) {
        tips.push(AtsTip {
            check: "contact_info",
            severity: Severity::Critical,
            message: "No e-mail address detected. Put contact details in the body text, not in a header, footer or image."
                .to_string(),
        });
    }

    total += 1;
    let words = resume_text.split_whitespace().count();
    if words < MIN_WORDS {
        tips.push(AtsTip {
            check: "length",
            severity: Severity::Warning,
            message: format!(
                "Only {words} words were extracted. Either the résumé is very short or parts of it are images or text boxes the ATS cannot read."
            ),
        });
    } else if words > MAX_WORDS {
        tips.push(AtsTip {
            check: "length",
            severity: Severity::Info,
            message: format!(
                "{words} words is longer than two pages. Trim older or less relevant roles."
            ),
        });
    }

    total += 1;
    let bullets: Vec<&str> = lines
        .iter()
        .filter_map(|l| strip_bullet(l))
        .collect();
    if bullets.is_empty() {
        tips.push(AtsTip {
            check: "bullets",
            severity: Severity::Warning,
            message: "No bullet points detected. Describe achievements as short bullet points under each role."
                .to_string(),
        });
    }

    total += 1;
    let quantified = bullets
        .iter()
        .filter(|b| b.chars().any(|c| c.is_ascii_digit() || c == '%' || c == '$'))
        .count();
    if bullets.is_empty() || quantified * 3 < bullets.len() {
        tips.push(AtsTip {
            check: "quantified_impact",
            severity: Severity::Info,
            message: format!(
                "{quantified} of {} bullet points contain a number. Quantify impact (users, %, time saved, revenue) where you can.",
                bullets.len()
            ),
        });
    }

    let failed = tips.len() as u32;
    AtsReport {
        checks_passed: total - failed,
        checks_total: total,
        tips,
    }
}

/// A heading is a short line whose normalized text equals or starts with an alias.
fn is_heading(line: &str, aliases: &[&str]) -> bool {
    if line.split_whitespace().count() > 4 {
        return false;
    }
    let normalized = line
        .trim_end_matches(':')
        .trim()
        .to_lowercase();
    aliases.iter().any(|a| normalized == *a || normalized.starts_with(a))
}

fn looks_like_email(token: &str) -> bool {
    let token = token.trim_matches(|c: char| !c.is_alphanumeric());
    match token.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(BULLET_MARKERS)?;
    let rest = rest.trim_start();
    (!rest.is_empty()).then_some(rest)
}
