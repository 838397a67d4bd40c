//! Case-record endpoints: movements and piece contents.

use async_trait::async_trait;
use minuta_core::error::FetchError;
use minuta_core::{
    CandidateEvent, MovementRequest, MovementSource, PieceContent, PieceContentSource,
    PieceRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::BackendClient;
use crate::wire::{ErrorReply, MovementsBody, MovementsReply, PieceBody, PieceReply};

const UNKNOWN_ERROR: &str = "Erro desconhecido";

impl BackendClient {
    /// POST `body` to a fetch endpoint and decode the reply.
    async fn post_fetch<B, R>(&self, path: &str, body: &B) -> Result<R, FetchError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .timeout(self.fetch_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, path, body = %error_body, "Backend returned error");
            let message = serde_json::from_str::<ErrorReply>(&error_body)
                .map(|e| e.error)
                .unwrap_or(error_body);
            return Err(FetchError::Remote {
                status_code: status,
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl MovementSource for BackendClient {
    async fn fetch_movements(
        &self,
        request: MovementRequest,
    ) -> Result<Vec<CandidateEvent>, FetchError> {
        let body = MovementsBody {
            numero_processo: request.process.digits(),
            sistema: &request.system_id,
        };

        let reply: MovementsReply = self.post_fetch("/api/buscar_movimentos", &body).await?;

        if !reply.success {
            return Err(FetchError::Rejected(
                reply.error.unwrap_or_else(|| UNKNOWN_ERROR.into()),
            ));
        }

        let events: Vec<CandidateEvent> = reply
            .movimentos
            .unwrap_or_default()
            .into_iter()
            .map(CandidateEvent::from)
            .collect();

        debug!(process = %request.process, events = events.len(), "Movements fetched");
        Ok(events)
    }
}

#[async_trait]
impl PieceContentSource for BackendClient {
    async fn fetch_piece(&self, request: PieceRequest) -> Result<PieceContent, FetchError> {
        let body = PieceBody {
            numero_processo: request.process.digits(),
            id_peca: request.piece_id.as_str(),
            sistema: &request.system_id,
        };

        let reply: PieceReply = self.post_fetch("/api/buscar_conteudo_peca", &body).await?;

        if !reply.success {
            return Err(FetchError::Rejected(
                reply.error.unwrap_or_else(|| UNKNOWN_ERROR.into()),
            ));
        }

        let content = PieceContent::from(reply);
        debug!(
            piece = %request.piece_id,
            available = content.content_available,
            has_text = content.text().is_some(),
            "Piece content fetched"
        );
        Ok(content)
    }
}
