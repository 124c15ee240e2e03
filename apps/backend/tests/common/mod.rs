#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Write};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use backend::config::Config;
use backend::db::create_pool;
use backend::documents::DOCX_MIME;
use backend::llm_client::{CompletionProvider, EmbeddingProvider, LlmError, EMBEDDING_DIMENSION};
use backend::routes::build_app;
use backend::state::AppState;

pub const BOUNDARY: &str = "resume-matcher-test-boundary";

pub const RESUME_TEXT: &str = "Alex Chen\nReact developer";
pub const IMPROVED_RESUME: &str = "Alex Chen\nReact TypeScript GraphQL developer";
pub const HELVETICA_FONT: &str =
    "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>";
pub const JOB_TEXT: &str = "Frontend Developer at Acme. Must know React and TypeScript. GraphQL is a plus.";

/// Canned Gemini stand-in. Picks a reply from the prompt's template.
pub struct StubLlm {
    pub failing: bool,
}

#[async_trait]
impl CompletionProvider for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if self.failing {
            return Err(LlmError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            });
        }

        let reply = if prompt.contains("Compare this resume against the numbered job positions") {
            json!({
                "jobs": [
                    {"index": 1, "match_percentage": 85, "fit_summary": "Strong React overlap", "improvements": ["Add GraphQL"]},
                    {"index": 2, "match_percentage": "20%", "fit_summary": "Different stack", "improvements": []}
                ]
            })
            .to_string()
        } else if prompt.contains("Compare the original resume with the improved version") {
            json!({"suggestions": [{"suggestion": "Mention TypeScript and GraphQL", "line_number": 2}]})
                .to_string()
        } else if prompt.contains("expert resume editor") {
            format!("```markdown\n{IMPROVED_RESUME}\n```")
        } else if prompt.contains("Analyze this resume against the job description") {
            json!({
                "match_percentage": 72,
                "strengths": ["React"],
                "improvements": ["Show TypeScript work"],
                "missing_skills": ["GraphQL"],
                "recommendations": ["Add a projects section"],
                "ats_score": 6,
                "ats_recommendations": ["Use standard headings"]
            })
            .to_string()
        } else if prompt.contains("Extract the most important keywords") {
            json!({
                "job_title": "Frontend Developer",
                "company": "Acme",
                "required_skills": ["React", "TypeScript"],
                "preferred_skills": ["GraphQL"],
                "keywords": ["React"]
            })
            .to_string()
        } else if prompt.contains("Extract structured data") {
            json!({"name": "Alex Chen", "skills": ["React"]}).to_string()
        } else {
            "OK".to_string()
        };
        Ok(reply)
    }

    fn model(&self) -> &str {
        "stub-llm"
    }
}

/// Bag-of-words embedding: each lowercase token is hashed into one of
/// `EMBEDDING_DIMENSION` buckets, so shared vocabulary means higher similarity.
pub struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let mut vector = vec![0.0f32; EMBEDDING_DIMENSION];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % EMBEDDING_DIMENSION as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn model(&self) -> &str {
        "stub-embedding"
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

pub async fn test_app() -> TestApp {
    test_app_with_llm(StubLlm { failing: false }).await
}

pub async fn test_app_with_llm(llm: StubLlm) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let database_url = format!("sqlite://{}", dir.path().join("api.db").display());
    let config = Config::from_lookup(|key| match key {
        "GEMINI_API_KEY" => Some("test-key".to_string()),
        "DATABASE_URL" => Some(database_url.clone()),
        "MAX_UPLOAD_BYTES" => Some("4096".to_string()),
        _ => None,
    })
    .unwrap();

    let state = AppState {
        db: create_pool(&config.database_url).await.unwrap(),
        llm: Arc::new(llm),
        embedder: Arc::new(StubEmbedder),
        config,
    };

    TestApp {
        router: build_app(state.clone()),
        state,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(uri, body.to_string())).await
    }

    /// Uploads `RESUME_TEXT` as a DOCX and returns the new résumé id.
    pub async fn upload_resume(&self) -> String {
        let request = multipart_request("file", "cv.docx", DOCX_MIME, &build_docx(RESUME_TEXT));
        let (status, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["resume_id"].as_str().unwrap().to_string()
    }
}

pub fn json_request(uri: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

pub fn multipart_request(field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    write!(
        body,
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .unwrap();
    body.extend_from_slice(bytes);
    write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();

    Request::post("/api/v1/resumes/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Minimal DOCX container with one paragraph per line of `text`.
pub fn build_docx(text: &str) -> Vec<u8> {
    let paragraphs: String = text
        .lines()
        .map(|line| format!("<w:p><w:r><w:t>{line}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{paragraphs}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Single-page PDF with `/F1` bound to `font` and `content` as the page stream.
pub fn build_pdf(content: &str, font: &str) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
        font.to_string(),
    ];

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        write!(out, "{} 0 obj\n{body}\nendobj\n", i + 1).unwrap();
    }
    let xref = out.len();
    write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).unwrap();
    for offset in offsets {
        write!(out, "{offset:010} 00000 n \n").unwrap();
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    )
    .unwrap();
    out
}
