//! Generation session: submits the assembled document and keeps the
//! generated text plus its adjustment versions.
//!
//! The first successful [`DraftSession::generate`] becomes the base for
//! every later [`DraftSession::adjust`]. Each adjustment is kept as a
//! numbered [`Version`]; numbers are never reused within a session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use minuta_config::GenerationConfig;
use minuta_core::{
    AdjustmentRequest, DraftEvent, EventBus, GenerationError, GenerationRequest,
    GenerationResponse, GenerationService, Objective, ObjectiveFields, ProcessNumber, Result,
    SubmittedFragment, TokensInfo,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assembler::DocumentAssembler;

/// What the user filled in besides the fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationForm {
    pub process: Option<ProcessNumber>,
    pub objective: Objective,
    pub fields: ObjectiveFields,
    pub prompt_id: Option<String>,
    pub model_id: Option<String>,
}

impl GenerationForm {
    /// A draft decision form.
    pub fn minuta(how_to_decide: impl Into<String>) -> Self {
        Self {
            process: None,
            objective: Objective::Minuta,
            fields: ObjectiveFields::Decision {
                how_to_decide: how_to_decide.into(),
                grounds: String::new(),
                restrictions: String::new(),
            },
            prompt_id: None,
            model_id: None,
        }
    }

    /// A summary or report form with free instructions.
    pub fn instructions(objective: Objective, extra_instructions: impl Into<String>) -> Self {
        Self {
            process: None,
            objective,
            fields: ObjectiveFields::Instructions {
                extra_instructions: extra_instructions.into(),
            },
            prompt_id: None,
            model_id: None,
        }
    }

    pub fn with_process(mut self, process: ProcessNumber) -> Self {
        self.process = Some(process);
        self
    }

    pub fn with_prompt(mut self, prompt_id: impl Into<String>) -> Self {
        self.prompt_id = Some(prompt_id.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Grounds and restrictions of a decision form. No-op for other forms.
    pub fn with_decision_details(
        mut self,
        grounds: impl Into<String>,
        restrictions: impl Into<String>,
    ) -> Self {
        if let ObjectiveFields::Decision {
            grounds: g,
            restrictions: r,
            ..
        } = &mut self.fields
        {
            *g = grounds.into();
            *r = restrictions.into();
        }
        self
    }

    fn validate(&self) -> std::result::Result<(), GenerationError> {
        match (self.objective, &self.fields) {
            (Objective::Minuta, ObjectiveFields::Decision { how_to_decide, .. })
                if !how_to_decide.trim().is_empty() =>
            {
                Ok(())
            }
            (Objective::Minuta, _) => Err(GenerationError::MissingField("how_to_decide")),
            _ => Ok(()),
        }
    }
}

/// An adjusted text kept alongside the main draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Version {
    pub number: u32,
    pub content: String,
    pub adjustment_prompt: String,
    pub model_id: Option<String>,
    pub tokens: Option<TokensInfo>,
    /// Cost as shown to the user
    pub cost: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One drafting session against a [`GenerationService`].
pub struct DraftSession {
    service: Arc<dyn GenerationService>,
    timeout: Duration,
    usd_to_brl: f64,
    event_bus: Option<Arc<EventBus>>,

    /// Request behind the current draft
    base: Option<GenerationRequest>,
    last_response: Option<GenerationResponse>,
    current_content: String,

    versions: Vec<Version>,
    last_version_number: u32,
}

impl DraftSession {
    pub fn new(service: Arc<dyn GenerationService>, config: &GenerationConfig) -> Self {
        Self {
            service,
            timeout: config.timeout(),
            usd_to_brl: config.usd_to_brl,
            event_bus: None,
            base: None,
            last_response: None,
            current_content: String::new(),
            versions: Vec::new(),
            last_version_number: 0,
        }
    }

    /// Override the generation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Publish generation events on the given bus.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Submit the document for generation.
    ///
    /// On success the response text becomes the current content and the
    /// request becomes the base for adjustments.
    pub async fn generate(
        &mut self,
        assembler: &DocumentAssembler,
        form: GenerationForm,
    ) -> Result<GenerationResponse> {
        let fragments: Vec<SubmittedFragment> = assembler
            .submission_sequence()?
            .iter()
            .map(SubmittedFragment::from)
            .collect();

        if fragments.is_empty() {
            return Err(GenerationError::MissingFragments.into());
        }
        form.validate()?;

        let request = GenerationRequest {
            process: form.process,
            objective: form.objective,
            fragments,
            prompt_id: form.prompt_id,
            model_id: form.model_id,
            fields: form.fields,
        };

        info!(
            objective = %request.objective,
            fragments = request.fragments.len(),
            model = request.model_id.as_deref().unwrap_or("default"),
            "Requesting generation"
        );

        let call = self.service.generate(request.clone());
        let response = self.bounded("generate", call).await?;

        let tokens_used = response.tokens.as_ref().map_or(0, |t| t.total_tokens);
        info!(tokens_used, "Draft generated");
        self.publish(DraftEvent::DraftGenerated {
            objective: request.objective.to_string(),
            model: response
                .tokens
                .as_ref()
                .and_then(|t| t.model_used.clone())
                .or_else(|| request.model_id.clone()),
            tokens_used,
            timestamp: Utc::now(),
        });

        self.current_content = response.text.clone();
        self.base = Some(request);
        self.last_response = Some(response.clone());
        Ok(response)
    }

    /// Refine the current content. The result is kept as a new version.
    pub async fn adjust(&mut self, prompt: &str, model_id: Option<String>) -> Result<Version> {
        let Some(base) = self.base.clone() else {
            return Err(GenerationError::NoBaseGeneration.into());
        };
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyAdjustment.into());
        }
        if self.current_content.trim().is_empty() {
            return Err(GenerationError::MissingField("current_content").into());
        }

        let request = AdjustmentRequest {
            objective: base.objective,
            base,
            adjustment_prompt: prompt.trim().to_string(),
            current_content: self.current_content.clone(),
            model_id: model_id.clone(),
        };

        debug!(
            prompt_len = request.adjustment_prompt.len(),
            content_len = request.current_content.len(),
            "Requesting adjustment"
        );

        let call = self.service.adjust(request.clone());
        let response = self.bounded("adjust", call).await?;

        self.last_version_number += 1;
        let version = Version {
            number: self.last_version_number,
            cost: response.cost_display(self.usd_to_brl),
            content: response.text,
            adjustment_prompt: request.adjustment_prompt,
            model_id,
            tokens: response.tokens,
            created_at: Utc::now(),
        };
        info!(version = version.number, "Adjustment kept as version");
        self.publish(DraftEvent::VersionCreated {
            number: version.number,
            timestamp: version.created_at,
        });

        self.versions.push(version.clone());
        Ok(version)
    }

    /// Await a service call under the session timeout.
    async fn bounded<F>(&self, context: &str, call: F) -> Result<GenerationResponse>
    where
        F: std::future::Future<Output = std::result::Result<GenerationResponse, GenerationError>>,
    {
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) if response.text.trim().is_empty() => {
                Err(GenerationError::EmptyResult)
            }
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        };

        outcome.map_err(|e| {
            warn!(context, error = %e, "Generation call failed");
            self.publish(DraftEvent::ErrorOccurred {
                context: context.to_string(),
                error_message: e.to_string(),
                timestamp: Utc::now(),
            });
            e.into()
        })
    }

    // ── Current draft ────────────────────────────────────────────────────

    pub fn has_draft(&self) -> bool {
        self.base.is_some()
    }

    /// Text in the main editor.
    pub fn current_content(&self) -> &str {
        &self.current_content
    }

    /// Replace the main editor text (user edits).
    pub fn set_current_content(&mut self, content: impl Into<String>) {
        self.current_content = content.into();
    }

    pub fn base_request(&self) -> Option<&GenerationRequest> {
        self.base.as_ref()
    }

    pub fn last_response(&self) -> Option<&GenerationResponse> {
        self.last_response.as_ref()
    }

    /// Cost of a response as shown to the user (`"R$ 0,11"`).
    pub fn cost_display(&self, response: &GenerationResponse) -> Option<String> {
        response.cost_display(self.usd_to_brl)
    }

    // ── Versions ─────────────────────────────────────────────────────────

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn version(&self, number: u32) -> Option<&Version> {
        self.versions.iter().find(|v| v.number == number)
    }

    pub fn remove_version(&mut self, number: u32) -> Option<Version> {
        let index = self.versions.iter().position(|v| v.number == number)?;
        debug!(version = number, "Version removed");
        Some(self.versions.remove(index))
    }

    /// Make a version's text the current content.
    pub fn use_version_as_base(&mut self, number: u32) -> bool {
        let Some(content) = self.version(number).map(|v| v.content.clone()) else {
            return false;
        };
        self.current_content = content;
        debug!(version = number, "Version applied to main draft");
        true
    }

    pub fn clear_versions(&mut self) {
        self.versions.clear();
    }

    fn publish(&self, event: DraftEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
