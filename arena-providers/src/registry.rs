use arena_core::{
    ArenaConfig, CoreError, FrameworkId, FrameworkProfile, PricingTable, ProviderAdapter, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::adapter::FrameworkAdapter;
use crate::client::SimulatorClient;
use crate::mock::MockPath;

/// Maps framework identifiers to their adapters.
///
/// Built once from configuration and shared read-only across a batch.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<FrameworkId, Arc<dyn ProviderAdapter>>,
    pricing: Arc<PricingTable>,
}

impl AdapterRegistry {
    pub fn new(pricing: Arc<PricingTable>) -> Self {
        Self {
            adapters: HashMap::new(),
            pricing,
        }
    }

    /// One [`FrameworkAdapter`] per built-in framework, wired from configuration.
    pub fn from_config(config: &ArenaConfig) -> Result<Self> {
        config.check()?;

        let pricing = Arc::new(PricingTable::from_config(&config.pricing));
        let client = SimulatorClient::new(config.simulator.clone())
            .map_err(|e| CoreError::Configuration(format!("failed to build HTTP client: {e}")))?;
        let client = Arc::new(client);
        let mock = MockPath::new(config.mock.latency());

        let mut registry = Self::new(Arc::clone(&pricing));
        for profile in FrameworkProfile::builtin() {
            let raw = config.credentials.get(&profile.id);
            let adapter = FrameworkAdapter::new(
                profile,
                raw,
                Arc::clone(&client),
                Arc::clone(&pricing),
                mock.clone(),
            );

            info!(
                framework = %adapter.framework(),
                live = adapter.is_live(),
                "Registered provider adapter"
            );
            registry.register(Arc::new(adapter));
        }

        Ok(registry)
    }

    /// Register or replace the adapter for its framework.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.framework().clone(), adapter);
    }

    pub fn get(&self, framework: &FrameworkId) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(framework).cloned()
    }

    pub fn contains(&self, framework: &FrameworkId) -> bool {
        self.adapters.contains_key(framework)
    }

    /// Registered framework identifiers, sorted.
    pub fn frameworks(&self) -> Vec<FrameworkId> {
        let mut ids: Vec<FrameworkId> = self.adapters.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn pricing(&self) -> &Arc<PricingTable> {
        &self.pricing
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("frameworks", &self.frameworks())
            .finish_non_exhaustive()
    }
}
