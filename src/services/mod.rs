pub mod answer_service;
pub mod answer_writer;
pub mod image_encoder;
pub mod llm_service;
pub mod prompt_builder;

pub use answer_service::AnswerService;
pub use answer_writer::{AnswerWriter, OutputFormat};
pub use llm_service::{CompletionClient, OpenAiCompletionClient};
pub use prompt_builder::{ChatMessage, ContentPart, PromptBuilder, PuzzleRequest};
