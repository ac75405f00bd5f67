pub mod config;
pub mod input;
pub mod parse;
pub mod plan;
pub mod windows;
