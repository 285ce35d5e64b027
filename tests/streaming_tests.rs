//! Streaming tests across the provider families
//!
//! Fixture-driven: each test replays a captured wire-level stream through
//! the provider's converter and asserts on the unified event sequence.

mod streaming {
    pub mod anthropic_fixtures_test;
    pub mod gemini_fixtures_test;
    pub mod ollama_ndjson_test;
    pub mod openai_fixtures_test;
}
