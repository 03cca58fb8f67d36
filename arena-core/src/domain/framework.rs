use serde::{Deserialize, Serialize};

use super::ids::FrameworkId;

/// Descriptive persona for an agent framework.
///
/// The strengths and process hint are only used to bias the simulated
/// narrative; they carry no behavioral meaning of their own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameworkProfile {
    pub id: FrameworkId,
    pub display_name: String,
    pub strengths: String,
    pub process_hint: String,
}

impl FrameworkProfile {
    pub fn new(
        id: impl Into<FrameworkId>,
        display_name: impl Into<String>,
        strengths: impl Into<String>,
        process_hint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            strengths: strengths.into(),
            process_hint: process_hint.into(),
        }
    }

    /// The built-in framework catalog, in display order.
    pub fn builtin() -> Vec<FrameworkProfile> {
        vec![
            Self::new(
                FrameworkId::LANGGRAPH,
                "LangGraph",
                "stateful graph orchestration, explicit control flow, checkpointed state",
                "plan the graph, route the task through nodes, checkpoint state, converge on an answer",
            ),
            Self::new(
                FrameworkId::AUTOGEN,
                "AutoGen",
                "multi-agent conversation, critique loops, code execution",
                "assign assistant and critic roles, exchange messages, refine until agreement",
            ),
            Self::new(
                FrameworkId::CREWAI,
                "CrewAI",
                "role-based crews, task delegation, sequential hand-offs",
                "define crew roles, delegate sub-tasks, review hand-offs, compile the crew report",
            ),
            Self::new(
                FrameworkId::LLAMAINDEX,
                "LlamaIndex",
                "retrieval over indexed data, query engines, grounded synthesis",
                "index the context, retrieve relevant chunks, synthesize a grounded response",
            ),
        ]
    }

    /// Look up a built-in profile by identifier.
    pub fn find_builtin(id: &FrameworkId) -> Option<FrameworkProfile> {
        Self::builtin().into_iter().find(|profile| &profile.id == id)
    }

    /// Individual stages of the process hint, used for step narratives.
    pub fn process_stages(&self) -> Vec<&str> {
        self.process_hint
            .split(',')
            .map(str::trim)
            .filter(|stage| !stage.is_empty())
            .collect()
    }
}
