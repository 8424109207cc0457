pub mod bootstrap;
pub mod config;
pub mod consts;
pub mod llm;
pub mod server;
pub mod social;
