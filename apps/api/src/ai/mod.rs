// AI writing assistance: resume feedback, summary drafting, bullet rewriting.
// All LLM calls go through llm_client. Nothing here touches the render pipeline.

pub mod feedback;
pub mod handlers;
pub mod prompts;
pub mod writer;
