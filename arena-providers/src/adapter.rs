use arena_core::{
    FrameworkId, FrameworkProfile, ModelId, PricingTable, ProviderAdapter, ResultRecord,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::client::SimulatorClient;
use crate::credential::Credential;
use crate::error::{policy_for, FailurePolicy, LiveFailure};
use crate::mock::MockPath;
use crate::simulation;

/// Provider adapter for one agent framework.
///
/// Chooses between the live simulation path and the mock path. Never fails:
/// recoverable live failures degrade to the mock record, everything else
/// becomes an "unavailable" record for this combination only.
#[derive(Debug, Clone)]
pub struct FrameworkAdapter {
    profile: FrameworkProfile,
    credential: Option<Credential>,
    client: Arc<SimulatorClient>,
    pricing: Arc<PricingTable>,
    mock: MockPath,
}

impl FrameworkAdapter {
    pub fn new(
        profile: FrameworkProfile,
        raw_credential: Option<&str>,
        client: Arc<SimulatorClient>,
        pricing: Arc<PricingTable>,
        mock: MockPath,
    ) -> Self {
        Self {
            profile,
            credential: Credential::resolve(raw_credential),
            client,
            pricing,
            mock,
        }
    }

    pub fn profile(&self) -> &FrameworkProfile {
        &self.profile
    }

    /// Whether a live call will be attempted.
    pub fn is_live(&self) -> bool {
        self.credential.is_some()
    }

    async fn run_live(
        &self,
        credential: &Credential,
        task: &str,
        model: &ModelId,
        model_display: &str,
    ) -> Result<ResultRecord, LiveFailure> {
        let messages = simulation::build_messages(&self.profile, model_display, task);
        let completion = self.client.complete(credential, &messages).await?;
        let run = simulation::parse_run(&completion.content)?;
        Ok(simulation::into_record(run, &completion, &self.pricing, model))
    }
}

#[async_trait]
impl ProviderAdapter for FrameworkAdapter {
    fn framework(&self) -> &FrameworkId {
        &self.profile.id
    }

    #[instrument(skip(self, task), fields(framework = %self.profile.id, model = %model))]
    async fn execute(&self, task: &str, model: &ModelId) -> ResultRecord {
        let model_display = self.pricing.display_name(model);

        let Some(credential) = &self.credential else {
            debug!("No usable credential, using mock path");
            return self.mock.respond(&self.profile, &model_display, task).await;
        };

        let failure = match self.run_live(credential, task, model, &model_display).await {
            Ok(record) => {
                debug!(tokens = record.tokens, cost = %record.cost, "Live path succeeded");
                return record;
            }
            Err(failure) => failure,
        };

        match policy_for(&failure) {
            FailurePolicy::FallBackToMock => {
                warn!(
                    code = failure.code(),
                    error = %failure,
                    "Live path failed, falling back to mock"
                );
                self.mock.respond(&self.profile, &model_display, task).await
            }
            // Retries are handled by the client; a Retry policy reaching this
            // point means the attempts are used up.
            FailurePolicy::Retry | FailurePolicy::Surface => {
                warn!(
                    code = failure.code(),
                    error = %failure,
                    "Live path failed, combination unavailable"
                );
                ResultRecord::unavailable(format!(
                    "{} unavailable: {}",
                    self.profile.display_name, failure
                ))
            }
        }
    }
}
