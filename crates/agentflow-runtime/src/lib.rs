//! Runtime Service (C6) and its supporting credential lookup + provider
//! adapter. Binds `agentflow-store`'s collaborator interfaces to
//! `agentflow-pipeline`'s compiled graph and exposes the three public
//! operations spec.md §4.4 names: `process`, `stream`, `process_and_save`.

pub mod credentials;
pub mod error;
pub mod event;
pub mod providers;
pub mod service;

pub use error::{Result, RuntimeError};
pub use event::RuntimeEvent;
pub use providers::OpenAiChatModel;
pub use service::AgentRuntimeService;
