// src/core/mod.rs
//! Configuration, file access, templating and the chat service client

pub mod config_manager;
pub mod fs_ops;
pub mod service_client;
pub mod template_engine;

pub use config_manager::ConfigManager;
pub use fs_ops::FsOps;
pub use service_client::{ChatRole, ChatSession, ChatTurn, GeminiChat};
pub use template_engine::TemplateEngine;
