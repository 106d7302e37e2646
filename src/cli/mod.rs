pub mod parser;
pub mod show;
