pub mod config;
pub mod generate;
pub mod mermaid;
pub mod providers;
pub mod serve;
