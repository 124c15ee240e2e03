mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use backend::documents::{DOCX_MIME, PDF_MIME};
use common::{
    build_docx, build_pdf, multipart_request, test_app, test_app_with_llm, StubLlm,
    HELVETICA_FONT, IMPROVED_RESUME, JOB_TEXT, RESUME_TEXT,
};

// ── Service surface ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ping_reports_database() {
    let app = test_app().await;
    let (status, body) = app.get("/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong");
    assert_eq!(body["database"], "reachable");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app().await;
    let (status, _) = app.get("/api/v1/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let app = test_app().await;
    let request = Request::delete("/ping").body(Body::empty()).unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_openapi_lists_routes() {
    let app = test_app().await;
    let (status, body) = app.get("/api/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/resumes/upload"].is_object());
    assert!(body["paths"]["/api/v1/match"].is_object());
    assert!(body["components"].is_object());
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let app = test_app().await;
    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/match")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .router
        .clone()
        .oneshot(preflight("http://localhost:3000"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );

    let response = app
        .router
        .clone()
        .oneshot(preflight("http://evil.example"))
        .await
        .unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

// ── Résumé upload ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_docx_stores_resume_and_profile() {
    let app = test_app().await;
    let request = multipart_request("file", "cv.docx", DOCX_MIME, &build_docx(RESUME_TEXT));
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["processed"], true);
    assert!(body["message"].as_str().unwrap().contains("cv.docx"));

    let resume_id = body["resume_id"].as_str().unwrap();
    let (status, body) = app.get(&format!("/api/v1/resumes/{resume_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], RESUME_TEXT);
    assert_eq!(body["data"]["content_type"], DOCX_MIME);
    assert_eq!(body["data"]["processed"]["name"], "Alex Chen");

    let (_, body) = app.get("/api/v1/resumes").await;
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["job_count"], 0);
}

#[tokio::test]
async fn test_upload_text_file_is_invalid_type() {
    let app = test_app().await;
    let request = multipart_request("file", "cv.txt", "text/plain", b"Alex Chen\nReact");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid file type"));
}

#[tokio::test]
async fn test_upload_without_file_field_is_422() {
    let app = test_app().await;
    let request = multipart_request("attachment", "cv.docx", DOCX_MIME, &build_docx(RESUME_TEXT));
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
}

#[tokio::test]
async fn test_upload_empty_file_is_400() {
    let app = test_app().await;
    let request = multipart_request("file", "cv.pdf", PDF_MIME, b"");
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_limit_is_413() {
    let app = test_app().await;
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.resize(app.state.config.max_upload_bytes + 1, b' ');
    let request = multipart_request("file", "cv.pdf", PDF_MIME, &bytes);
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{body}");
}

#[tokio::test]
async fn test_upload_unreadable_pdf_is_422() {
    let app = test_app().await;
    let request = multipart_request("file", "cv.pdf", PDF_MIME, b"definitely not a pdf");
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_pdf_with_broken_fonts_is_422() {
    let app = test_app().await;
    for (content, font) in [
        ("BT /F9 12 Tf 72 720 Td (Alex Chen) Tj ET", HELVETICA_FONT),
        ("BT /F1 12 Tf 72 720 Td (Alex Chen) Tj ET", "<< /Type /Font /Subtype /Type1 >>"),
    ] {
        let request = multipart_request("file", "cv.pdf", PDF_MIME, &build_pdf(content, font));
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    // The server keeps serving after a failed extraction
    let (status, _) = app.get("/ping").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_pdf_extracts_text() {
    let app = test_app().await;
    let pdf = build_pdf("BT /F1 12 Tf 72 720 Td (Alex Chen React developer) Tj ET", HELVETICA_FONT);
    let request = multipart_request("file", "cv.pdf", PDF_MIME, &pdf);
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let resume_id = body["resume_id"].as_str().unwrap();
    let (_, body) = app.get(&format!("/api/v1/resumes/{resume_id}")).await;
    assert!(body["data"]["content"].as_str().unwrap().contains("React"), "{body}");
}

#[tokio::test]
async fn test_upload_survives_llm_failure() {
    let app = test_app_with_llm(StubLlm { failing: true }).await;
    let request = multipart_request("file", "cv.docx", DOCX_MIME, &build_docx(RESUME_TEXT));
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed"], false);
}

#[tokio::test]
async fn test_unknown_resume_is_404() {
    let app = test_app().await;
    let (status, body) = app
        .get(&format!("/api/v1/resumes/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// ── Jobs and improvement ────────────────────────────────────────────────────

#[tokio::test]
async fn test_job_upload_and_fetch() {
    let app = test_app().await;
    let resume_id = app.upload_resume().await;

    let (status, body) = app
        .post_json(
            "/api/v1/jobs/upload",
            json!({"resume_id": resume_id, "job_descriptions": [JOB_TEXT, "   "]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let job_ids = body["job_id"].as_array().unwrap();
    assert_eq!(job_ids.len(), 1, "blank descriptions are skipped");
    let job_id = job_ids[0].as_str().unwrap();

    let (status, body) = app.get(&format!("/api/v1/jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], JOB_TEXT);
    assert_eq!(body["data"]["keywords"]["job_title"], "Frontend Developer");

    let (_, body) = app
        .get(&format!("/api/v1/jobs?resume_id={resume_id}"))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["keywords_extracted"], true);

    let (_, body) = app.get(&format!("/api/v1/resumes/{resume_id}")).await;
    assert_eq!(body["data"]["jobs"][0]["job_id"], job_id);
}

#[tokio::test]
async fn test_job_upload_validation() {
    let app = test_app().await;

    let (status, _) = app
        .post_json(
            "/api/v1/jobs/upload",
            json!({"resume_id": Uuid::new_v4(), "job_descriptions": [JOB_TEXT]}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let resume_id = app.upload_resume().await;
    let (status, _) = app
        .post_json(
            "/api/v1/jobs/upload",
            json!({"resume_id": resume_id, "job_descriptions": []}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json("/api/v1/jobs/upload", json!({"resume_id": resume_id}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_job_upload_rejects_more_than_ten() {
    let app = test_app().await;
    let resume_id = app.upload_resume().await;
    let descriptions: Vec<String> = (0..11).map(|i| format!("{JOB_TEXT} Opening {i}.")).collect();

    let (status, body) = app
        .post_json(
            "/api/v1/jobs/upload",
            json!({"resume_id": resume_id, "job_descriptions": descriptions}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (_, body) = app
        .get(&format!("/api/v1/jobs?resume_id={resume_id}"))
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_improve_rewrites_and_records() {
    let app = test_app().await;
    let resume_id = app.upload_resume().await;
    let (_, body) = app
        .post_json(
            "/api/v1/jobs/upload",
            json!({"resume_id": resume_id, "job_descriptions": [JOB_TEXT]}),
        )
        .await;
    let job_id = body["job_id"][0].as_str().unwrap().to_string();

    let (status, body) = app
        .post_json(
            "/api/v1/resumes/improve",
            json!({"resume_id": resume_id, "job_id": job_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["updated_resume"], IMPROVED_RESUME);
    assert_eq!(data["attempts"], 1);
    assert!(data["new_score"].as_f64().unwrap() > data["original_score"].as_f64().unwrap());
    let missing: Vec<&str> = data["missing_keywords"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|k| k.as_str())
        .collect();
    assert!(missing.contains(&"TypeScript"));
    assert!(missing.contains(&"GraphQL"));
    assert_eq!(data["suggestions"][0]["line_number"], 2);

    let (_, body) = app.get(&format!("/api/v1/resumes/{resume_id}")).await;
    let improvements = body["data"]["improvements"].as_array().unwrap();
    assert_eq!(improvements.len(), 1);
    assert_eq!(improvements[0]["job_id"], job_id.as_str());
    assert_eq!(improvements[0]["updated_resume"], IMPROVED_RESUME);
    assert_eq!(
        improvements[0]["suggestions"][0]["suggestion"],
        "Mention TypeScript and GraphQL"
    );
}

#[tokio::test]
async fn test_improve_malformed_json_is_422() {
    let app = test_app().await;
    let (status, body) = app
        .send(common::json_request(
            "/api/v1/resumes/improve",
            "{\"resume_id\": ".to_string(),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");

    let (status, _) = app
        .post_json("/api/v1/resumes/improve", json!({"resume_id": Uuid::new_v4()}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_improve_rejects_job_of_another_resume() {
    let app = test_app().await;
    let owner = app.upload_resume().await;
    let other = app.upload_resume().await;
    let (_, body) = app
        .post_json(
            "/api/v1/jobs/upload",
            json!({"resume_id": owner, "job_descriptions": [JOB_TEXT]}),
        )
        .await;
    let job_id = body["job_id"][0].as_str().unwrap().to_string();

    let (status, _) = app
        .post_json(
            "/api/v1/resumes/improve",
            json!({"resume_id": other, "job_id": job_id}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_resume_cascades() {
    let app = test_app().await;
    let resume_id = app.upload_resume().await;
    app.post_json(
        "/api/v1/jobs/upload",
        json!({"resume_id": resume_id, "job_descriptions": [JOB_TEXT]}),
    )
    .await;

    let uri = format!("/api/v1/resumes/{resume_id}");
    let (status, _) = app
        .send(Request::delete(uri.as_str()).body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.get("/api/v1/jobs").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = app
        .send(Request::delete(uri.as_str()).body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Stateless matching ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_match_returns_full_analysis() {
    let app = test_app().await;
    let (status, body) = app
        .post_json(
            "/api/v1/match",
            json!({"resume_text": RESUME_TEXT, "job_description": JOB_TEXT}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = body["data"].as_object().unwrap();
    let mut keys: Vec<&str> = data.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "ats_tips",
            "coverage",
            "job_keywords",
            "llm_analysis",
            "model",
            "similarity_score"
        ]
    );

    assert_eq!(data["model"], "stub-llm");
    assert_eq!(data["llm_analysis"]["match_percentage"], 72.0);
    assert_eq!(data["llm_analysis"]["ats_score"], 6.0);
    assert_eq!(data["llm_analysis"]["missing_skills"][0], "GraphQL");
    let similarity = data["similarity_score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&similarity));
    let missing = data["coverage"]["missing_keywords"].as_array().unwrap();
    assert!(missing.iter().any(|k| k == "GraphQL"));
    assert_eq!(data["job_keywords"]["job_title"], "Frontend Developer");
    assert!(data["ats_tips"]["checks_total"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_match_rejects_blank_input() {
    let app = test_app().await;
    let (status, _) = app
        .post_json(
            "/api/v1/match",
            json!({"resume_text": "  ", "job_description": JOB_TEXT}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_match_provider_failure_is_502() {
    let app = test_app_with_llm(StubLlm { failing: true }).await;
    let (status, body) = app
        .post_json(
            "/api/v1/match",
            json!({"resume_text": RESUME_TEXT, "job_description": JOB_TEXT}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "LLM_ERROR");
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("overloaded"));
}

#[tokio::test]
async fn test_compare_ranks_jobs() {
    let app = test_app().await;
    let (status, body) = app
        .post_json(
            "/api/v1/match/compare",
            json!({
                "resume_text": RESUME_TEXT,
                "jobs": [
                    {"title": "Data Engineer", "description": "Spark Scala Airflow pipelines"},
                    {"title": "Frontend", "description": JOB_TEXT}
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let ranked = body["data"].as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["title"], "Frontend");
    assert_eq!(ranked[0]["rank"], 1);
    // Commentary follows the request order, not the ranking
    assert_eq!(ranked[0]["fit_summary"], "Different stack");
    assert_eq!(ranked[1]["title"], "Data Engineer");
    assert_eq!(ranked[1]["match_percentage"], 85.0);
}

#[tokio::test]
async fn test_compare_rejects_empty_job_list() {
    let app = test_app().await;
    let (status, _) = app
        .post_json(
            "/api/v1/match/compare",
            json!({"resume_text": RESUME_TEXT, "jobs": []}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_rejects_more_than_ten_jobs() {
    let app = test_app().await;
    let jobs: Vec<_> = (0..11)
        .map(|i| json!({"title": format!("Role {i}"), "description": JOB_TEXT}))
        .collect();
    let (status, body) = app
        .post_json(
            "/api/v1/match/compare",
            json!({"resume_text": RESUME_TEXT, "jobs": jobs}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
