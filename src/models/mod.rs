pub mod loaders;
pub mod puzzle;

pub use loaders::load_puzzles;
pub use puzzle::{AnswerRecord, Puzzle};
