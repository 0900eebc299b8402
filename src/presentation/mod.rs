// Presentation layer - terminal rendering and operator input
pub mod operator;
pub mod terminal;
