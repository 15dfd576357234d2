pub mod config;
pub mod engine;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod providers;
pub mod report;
pub mod source;
pub mod storage;
pub mod taxonomy;
