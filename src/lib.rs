//! # Counsel
//!
//! Multi-agent career counseling pipelines backed by a language model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           ORCHESTRATOR                           │
//! │   validate input ─▶ pick vertical ─▶ run fleet ─▶ final response │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │
//!               ┌─────────────────┴─────────────────┐
//!               ▼                                   ▼
//!      ┌─────────────────┐                 ┌─────────────────┐
//!      │  School Fleet   │                 │  College Fleet  │
//!      └────────┬────────┘                 └────────┬────────┘
//!               │                                   │
//!     ┌───┬───┬─┴─┬───┐                   ┌───┬───┬─┴─┬───┐
//!     ▼   ▼   ▼   ▼   ▼                   ▼   ▼   ▼   ▼   ▼
//!    A1─▶A2─▶A3─▶A4─▶A5                  P ─▶ M ─▶ S ─▶ C ─▶ O
//! ```
//!
//! ## Key Concepts
//!
//! - **Agent**: one prompt, one model call, one JSON-repair parse
//! - **Fleet**: the agents of a vertical, run in dependency order with
//!   completed outputs passed forward
//! - **Vertical**: a counseling audience (school students, college students)
//! - **Session**: per-user context kept in a [`SessionStore`]

pub mod agent;
pub mod agents;
pub mod channel;
pub mod config;
pub mod dependency;
pub mod error;
pub mod fleet;
pub mod llm;
pub mod orchestrator;
pub mod parser;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

pub use agent::{Agent, AgentHandle};
pub use agents::{AgentKind, AgentProfile};
pub use channel::{EventChannel, EventSender, PipelineEvent};
pub use config::{init_tracing, Config, FleetSettings, LlmConfig};
pub use dependency::{AgentDependency, DependencyGraph};
pub use error::{AgentError, CounselError, LlmError, ParseError, StoreError};
pub use fleet::{ExecutionStrategy, FleetKind, FleetManager};
pub use llm::{GeminiClient, LanguageModel};
pub use orchestrator::{CounselResponse, Orchestrator, Vertical};
pub use parser::parse_model_output;
pub use session::{InMemorySessionStore, SessionContext, SessionStore};
pub use types::{AgentInput, AgentResult, DataMap, FleetResult, FleetStatus, ProcessingStatus, SessionId};
