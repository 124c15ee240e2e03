// Prompt templates for résumé / job matching.
// Fill placeholders with `llm_client::prompts::fill` and wrap JSON prompts
// with `llm_client::prompts::json_prompt`.

/// Structured résumé extraction. Replace `{resume_text}`.
pub const RESUME_STRUCTURE_PROMPT: &str = r#"Extract structured data from the following resume.

Return a JSON object with this EXACT schema (use null or [] when a field is absent):
{
  "name": "Alex Chen",
  "email": "alex.chen@email.com",
  "phone": "(555) 987-6543",
  "summary": "One or two sentence professional summary",
  "skills": ["React", "Node.js"],
  "experience": [
    {
      "title": "Full Stack Developer",
      "company": "WebTech Solutions",
      "start": "2020",
      "end": "Present",
      "highlights": ["Built RESTful APIs serving 25K+ daily active users"]
    }
  ],
  "education": [
    {"institution": "Tech University", "degree": "Bachelor of Computer Science", "year": "2019"}
  ],
  "certifications": ["AWS Certified Solutions Architect"]
}

Copy text verbatim where possible. Do NOT invent values.

RESUME:
{resume_text}"#;

/// Job keyword extraction. Replace `{job_text}`.
pub const JOB_KEYWORDS_PROMPT: &str = r#"Extract the most important keywords and skills from this job description.
Focus on technical skills, tools, and qualifications.

Return a JSON object with this EXACT schema:
{
  "job_title": "Senior React Developer",
  "company": "TechInnovate Inc.",
  "required_skills": ["React", "TypeScript"],
  "preferred_skills": ["Next.js"],
  "keywords": ["React", "TypeScript", "Redux", "Webpack", "Jest", "GraphQL"]
}

Rules:
- "required_skills": explicit must-haves ("required", "must have", minimum years).
- "preferred_skills": nice-to-haves ("preferred", "bonus", "a plus").
- "keywords": ALL meaningful technical keywords, prioritized by importance, most important first.
- Use the job description's own spelling for each keyword. Keep each keyword short (1-3 words).
- Do NOT include benefits, perks or company boilerplate.

JOB DESCRIPTION:
{job_text}"#;

/// Match analysis with ATS review.
/// Replace `{grounding_instruction}`, `{resume_text}`, `{job_text}`, `{missing_keywords}`.
pub const MATCH_ANALYSIS_PROMPT: &str = r#"Analyze this resume against the job description and provide an assessment,
including how likely the resume is to pass ATS (Applicant Tracking System) screening.

{grounding_instruction}

Return a JSON object with this EXACT schema:
{
  "match_percentage": 72,
  "strengths": ["Key strength that aligns with the job"],
  "improvements": ["Area for improvement"],
  "missing_skills": ["Skill or experience the job asks for that the resume lacks"],
  "recommendations": ["Specific, actionable recommendation"],
  "ats_score": 7,
  "ats_recommendations": ["Keyword density, section formatting or structure advice"]
}

Rules:
- "match_percentage" is an integer from 0 to 100.
- "ats_score" is an integer from 1 to 10.
- Keep each list to at most 5 items, each one sentence.
- A local keyword scan found these job keywords missing from the resume: {missing_keywords}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_text}"#;

/// Résumé rewrite. Plain markdown output, not JSON.
/// Replace `{grounding_instruction}`, `{resume_text}`, `{job_keywords}`,
/// `{missing_keywords}`, `{current_score}`.
pub const IMPROVE_RESUME_PROMPT: &str = r#"You are an expert resume editor. Rewrite the resume below so it is a stronger
match for a job whose key terms are listed. The current semantic similarity
between the resume and the job keywords is {current_score}.

{grounding_instruction}

Instructions:
- Work the job keywords into existing bullet points where the experience supports them.
- Prefer the job's wording for skills the candidate already has.
- Keep standard section headings (SUMMARY, EXPERIENCE, EDUCATION, SKILLS).
- Keep every role, date and employer exactly as given.
- Output the full rewritten resume as markdown and nothing else.

JOB KEYWORDS:
{job_keywords}

KEYWORDS CURRENTLY MISSING FROM THE RESUME:
{missing_keywords}

RESUME:
{resume_text}"#;

/// Line-level suggestions for an improved résumé.
/// Replace `{original_resume}`, `{updated_resume}`, `{job_keywords}`.
pub const SUGGESTIONS_PROMPT: &str = r#"Compare the original resume with the improved version and list the concrete
changes a candidate should make, tied to lines of the ORIGINAL resume.

Return a JSON object with this EXACT schema:
{
  "suggestions": [
    {"suggestion": "Mention TypeScript in the WebTech Solutions bullet about React apps", "line_number": 12}
  ]
}

Rules:
- At most 8 suggestions, most impactful first.
- "line_number" is the 1-based line in the ORIGINAL resume, or null for general advice.

JOB KEYWORDS:
{job_keywords}

ORIGINAL RESUME:
{original_resume}

IMPROVED RESUME:
{updated_resume}"#;

/// Multi-job comparison. Replace `{resume_text}`, `{jobs}`.
pub const COMPARE_JOBS_PROMPT: &str = r#"Compare this resume against the numbered job positions below.

Return a JSON object with this EXACT schema:
{
  "jobs": [
    {
      "index": 1,
      "match_percentage": 80,
      "fit_summary": "Key reasons for this level of fit",
      "improvements": ["Specific improvement needed for this role"]
    }
  ]
}

Rules:
- Include every job exactly once, using its number as "index".
- "match_percentage" is an integer from 0 to 100.
- At most 3 improvements per job.

RESUME:
{resume_text}

JOBS:
{jobs}"#;
