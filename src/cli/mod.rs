pub mod aether;
pub mod banner;
pub mod color;
pub mod completer;
pub mod highlighter;
pub mod prompt;
pub mod report;
