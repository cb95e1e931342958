pub mod board;
pub mod extract;
pub mod fetch;
pub mod report;
pub mod terminal;
