//! Generation endpoints and the model/prompt catalog.

use async_trait::async_trait;
use minuta_core::error::GenerationError;
use minuta_core::{
    AdjustmentRequest, GenerationCatalog, GenerationRequest, GenerationResponse,
    GenerationService, ModelInfo, Objective, PromptInfo,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::BackendClient;
use crate::wire::{
    AdjustBody, DefaultModelReply, ErrorReply, GenerateBody, GenerateReply, ModelsReply,
    PromptsReply,
};

impl BackendClient {
    async fn decode<R: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<R, GenerationError> {
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, path, body = %error_body, "Generation service returned error");
            let message = serde_json::from_str::<ErrorReply>(&error_body)
                .map(|e| e.error)
                .unwrap_or(error_body);
            return Err(GenerationError::Service {
                status_code: status,
                message,
            });
        }

        response.json().await.map_err(|e| GenerationError::Service {
            status_code: status,
            message: format!("Failed to parse response: {e}"),
        })
    }

    async fn post_generation<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<GenerationResponse, GenerationError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let reply: GenerateReply = Self::decode(response, path).await?;
        let generated = reply.into_response().ok_or(GenerationError::EmptyResult)?;

        info!(
            path,
            chars = generated.text.len(),
            tokens = generated.tokens.as_ref().map_or(0, |t| t.total_tokens),
            "Generation completed"
        );
        Ok(generated)
    }

    async fn get_catalog<R: DeserializeOwned>(&self, path: &str) -> Result<R, GenerationError> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Self::decode(response, path).await
    }
}

#[async_trait]
impl GenerationService for BackendClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        debug!(
            objective = %request.objective,
            fragments = request.fragments.len(),
            "Submitting generation"
        );
        self.post_generation("/generate_minuta", &GenerateBody::from(&request))
            .await
    }

    async fn adjust(
        &self,
        request: AdjustmentRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        debug!(objective = %request.objective, "Submitting adjustment");
        self.post_generation("/adjust_minuta", &AdjustBody::from(&request))
            .await
    }
}

#[async_trait]
impl GenerationCatalog for BackendClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError> {
        let reply: ModelsReply = self.get_catalog("/api/available_models").await?;
        Ok(reply.models)
    }

    async fn default_model(&self) -> Result<String, GenerationError> {
        let reply: DefaultModelReply = self.get_catalog("/api/default_model").await?;
        reply.into_id().ok_or_else(|| GenerationError::Service {
            status_code: 200,
            message: "No default model in response".into(),
        })
    }

    async fn prompts_for(&self, objective: Objective) -> Result<Vec<PromptInfo>, GenerationError> {
        let path = format!("/api/prompts/{}", objective.as_str());
        let reply: PromptsReply = self.get_catalog(&path).await?;
        Ok(reply.prompts.into_iter().map(PromptInfo::from).collect())
    }
}
