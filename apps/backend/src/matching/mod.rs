// Résumé / job matching: keyword coverage, embedding similarity, ATS checks
// and the LLM analysis pipeline. All provider calls go through llm_client.

pub mod analyzer;
pub mod ats;
pub mod coverage;
pub mod handlers;
pub mod prompts;
pub mod similarity;
