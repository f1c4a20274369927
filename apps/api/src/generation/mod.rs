// Generation: paywall gate → prompt rendering → LLM → quota accounting.
// All LLM calls go through llm_client — no direct API calls here.

pub mod generator;
pub mod handlers;
