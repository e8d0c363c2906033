pub mod puzzle_loader;

pub use puzzle_loader::load_puzzles;
