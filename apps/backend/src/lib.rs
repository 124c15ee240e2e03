pub mod config;
pub mod db;
pub mod documents;
pub mod errors;
pub mod extract;
pub mod jobs;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod resumes;
pub mod routes;
pub mod state;
