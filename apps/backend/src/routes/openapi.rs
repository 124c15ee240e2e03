use axum::Json;
use serde_json::{json, Value};

/// GET /api/openapi.json
pub async fn openapi_handler() -> Json<Value> {
    Json(openapi_document())
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": { "schema": { "$ref": format!("#/components/schemas/{schema}") } }
        }
    })
}

fn ok(description: &str) -> Value {
    json!({ "description": description })
}

fn id_param(name: &str) -> Value {
    json!([{
        "name": name,
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    }])
}

/// Hand-maintained OpenAPI 3 description of every route in `build_router`.
pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Resume Matcher API",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": {
            "/ping": {
                "get": { "summary": "Liveness and database check", "responses": { "200": ok("pong") } }
            },
            "/api/v1/resumes": {
                "get": { "summary": "List uploaded résumés", "responses": { "200": ok("Résumé summaries") } }
            },
            "/api/v1/resumes/upload": {
                "post": {
                    "summary": "Upload a PDF or DOCX résumé",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "multipart/form-data": {
                                "schema": {
                                    "type": "object",
                                    "required": ["file"],
                                    "properties": { "file": { "type": "string", "format": "binary" } }
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": ok("Résumé stored"),
                        "400": ok("Invalid file type or empty file"),
                        "413": ok("File too large"),
                        "422": ok("Missing file field or unreadable document")
                    }
                }
            },
            "/api/v1/resumes/{resume_id}": {
                "parameters": id_param("resume_id"),
                "get": { "summary": "Fetch a résumé with its jobs", "responses": { "200": ok("Résumé"), "404": ok("Not found") } },
                "delete": { "summary": "Delete a résumé and its jobs", "responses": { "204": ok("Deleted"), "404": ok("Not found") } }
            },
            "/api/v1/resumes/improve": {
                "post": {
                    "summary": "Rewrite a résumé towards one of its jobs",
                    "requestBody": json_body("ImproveRequest"),
                    "responses": {
                        "200": ok("Improvement result"),
                        "404": ok("Unknown résumé or job"),
                        "422": ok("Malformed request"),
                        "502": ok("AI provider failure")
                    }
                }
            },
            "/api/v1/jobs": {
                "get": {
                    "summary": "List jobs",
                    "parameters": [{
                        "name": "resume_id",
                        "in": "query",
                        "required": false,
                        "schema": { "type": "string", "format": "uuid" }
                    }],
                    "responses": { "200": ok("Job summaries") }
                }
            },
            "/api/v1/jobs/upload": {
                "post": {
                    "summary": "Attach job descriptions to a résumé",
                    "requestBody": json_body("JobUploadRequest"),
                    "responses": {
                        "200": ok("Jobs stored"),
                        "400": ok("No job descriptions"),
                        "404": ok("Unknown résumé"),
                        "422": ok("Malformed request")
                    }
                }
            },
            "/api/v1/jobs/{job_id}": {
                "parameters": id_param("job_id"),
                "get": { "summary": "Fetch a job", "responses": { "200": ok("Job"), "404": ok("Not found") } }
            },
            "/api/v1/match": {
                "post": {
                    "summary": "Analyse a résumé against a job description",
                    "requestBody": json_body("MatchRequest"),
                    "responses": { "200": ok("Match analysis"), "400": ok("Empty input"), "502": ok("AI provider failure") }
                }
            },
            "/api/v1/match/compare": {
                "post": {
                    "summary": "Rank several jobs against a résumé",
                    "requestBody": json_body("CompareRequest"),
                    "responses": { "200": ok("Ranked jobs"), "400": ok("Empty or too many jobs"), "502": ok("AI provider failure") }
                }
            }
        },
        "components": {
            "schemas": {
                "ImproveRequest": {
                    "type": "object",
                    "required": ["resume_id", "job_id"],
                    "properties": {
                        "resume_id": { "type": "string", "format": "uuid" },
                        "job_id": { "type": "string", "format": "uuid" }
                    }
                },
                "JobUploadRequest": {
                    "type": "object",
                    "required": ["resume_id", "job_descriptions"],
                    "properties": {
                        "resume_id": { "type": "string", "format": "uuid" },
                        "job_descriptions": { "type": "array", "items": { "type": "string" } }
                    }
                },
                "MatchRequest": {
                    "type": "object",
                    "required": ["resume_text", "job_description"],
                    "properties": {
                        "resume_text": { "type": "string" },
                        "job_description": { "type": "string" }
                    }
                },
                "CompareRequest": {
                    "type": "object",
                    "required": ["resume_text", "jobs"],
                    "properties": {
                        "resume_text": { "type": "string" },
                        "jobs": {
                            "type": "array",
                            "maxItems": 10,
                            "items": {
                                "type": "object",
                                "required": ["title", "description"],
                                "properties": {
                                    "title": { "type": "string" },
                                    "description": { "type": "string" }
                                }
                            }
                        }
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": { "type": "string" },
                                "message": { "type": "string" }
                            }
                        }
                    }
                }
            }
        }
    })
}
