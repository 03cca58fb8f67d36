use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{FrameworkId, ModelId};

/// One (framework, model) pair evaluated within a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Combination {
    pub framework: FrameworkId,
    pub model: ModelId,
}

impl Combination {
    pub fn new(framework: impl Into<FrameworkId>, model: impl Into<ModelId>) -> Self {
        Self {
            framework: framework.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.framework, self.model)
    }
}

/// A task plus the selected frameworks and models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub framework_ids: Vec<FrameworkId>,
    #[serde(default)]
    pub model_ids: Vec<ModelId>,
}

impl BatchRequest {
    pub fn new(
        task: impl Into<String>,
        framework_ids: impl IntoIterator<Item = impl Into<FrameworkId>>,
        model_ids: impl IntoIterator<Item = impl Into<ModelId>>,
    ) -> Self {
        Self {
            task: task.into(),
            framework_ids: framework_ids.into_iter().map(Into::into).collect(),
            model_ids: model_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Selected frameworks with duplicates removed, first occurrence kept.
    pub fn frameworks(&self) -> Vec<FrameworkId> {
        dedup_stable(&self.framework_ids)
    }

    /// Selected models with duplicates removed, first occurrence kept.
    pub fn models(&self) -> Vec<ModelId> {
        dedup_stable(&self.model_ids)
    }

    /// Cartesian product of the selections, framework-major, model-minor.
    pub fn combinations(&self) -> Vec<Combination> {
        let models = self.models();
        self.frameworks()
            .into_iter()
            .flat_map(|framework| {
                models
                    .iter()
                    .map(move |model| Combination::new(framework.clone(), model.clone()))
            })
            .collect()
    }
}

fn dedup_stable<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique
}
