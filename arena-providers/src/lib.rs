//! Agent Arena provider adapters
//!
//! One adapter per agent framework. Each adapter either runs the task on the
//! live path, where a general-purpose model simulates the framework through an
//! OpenAI-compatible chat API, or answers from the deterministic mock path.
//!
//! # Degradation
//!
//! Adapters never return an error. Missing or placeholder credentials select
//! the mock path up front. Live failures are classified into [`LiveFailure`]
//! and routed through [`policy_for`]:
//!
//! - credential, rate limit, quota, timeout, network and payload problems fall
//!   back to the mock path
//! - gateway errors (502-504) are retried, then surfaced
//! - any other upstream status is surfaced as an "unavailable" record
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use arena_core::{ArenaConfig, FrameworkId, ModelId};
//! use arena_providers::AdapterRegistry;
//!
//! # async fn run() -> arena_core::Result<()> {
//! let registry = AdapterRegistry::from_config(&ArenaConfig::default())?;
//! if let Some(adapter) = registry.get(&FrameworkId::new("langgraph")) {
//!     let record = adapter.execute("Summarize AI agents", &ModelId::new("gpt-41")).await;
//!     println!("{} tokens, ${}", record.tokens, record.cost);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod client;
pub mod credential;
pub mod error;
pub mod mock;
pub mod registry;
pub mod simulation;

pub use adapter::FrameworkAdapter;
pub use client::{ChatMessage, SimulatorClient, UpstreamCompletion};
pub use credential::{Credential, MIN_CREDENTIAL_LEN};
pub use error::{policy_for, FailurePolicy, LiveFailure};
pub use mock::MockPath;
pub use registry::AdapterRegistry;
pub use simulation::SimulatedRun;

/// Re-export of the adapter trait for convenience.
pub use arena_core::ProviderAdapter;
