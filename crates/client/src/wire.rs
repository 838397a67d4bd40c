//! JSON bodies exchanged with the drafting backend.
//!
//! Field names follow the backend's Portuguese API; conversions into the
//! domain types live here so the endpoint code stays thin.

use minuta_core::{
    AdjustmentRequest, CandidateEvent, CandidatePiece, CostInfo, FragmentId, GenerationRequest,
    GenerationResponse, ObjectiveFields, PieceContent, PromptInfo, TokensInfo,
};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

/// Court systems send ids and dates as strings or bare numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

fn lenient_size(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// --- Movements ---

#[derive(Debug, Serialize)]
pub(crate) struct MovementsBody<'a> {
    pub numero_processo: &'a str,
    pub sistema: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MovementsReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub movimentos: Option<Vec<WireMovement>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMovement {
    #[serde(deserialize_with = "string_or_number")]
    pub evento: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub data: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub pecas: Option<Vec<WirePiece>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePiece {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub rotulo: Option<String>,
    #[serde(default)]
    pub tamanho: Option<Value>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub data: String,
}

impl From<WirePiece> for CandidatePiece {
    fn from(piece: WirePiece) -> Self {
        let size = lenient_size(piece.tamanho.as_ref());
        Self {
            id: FragmentId(piece.id),
            descriptor: piece.descricao.unwrap_or_default(),
            kind: piece.tipo.unwrap_or_default(),
            mime_type: piece.mimetype.unwrap_or_default(),
            label: piece.rotulo,
            size,
            date: piece.data,
        }
    }
}

impl From<WireMovement> for CandidateEvent {
    fn from(movement: WireMovement) -> Self {
        Self {
            event_id: movement.evento,
            date: movement.data,
            description: movement.descricao.unwrap_or_default(),
            pieces: movement
                .pecas
                .unwrap_or_default()
                .into_iter()
                .map(CandidatePiece::from)
                .collect(),
        }
    }
}

// --- Piece content ---

#[derive(Debug, Serialize)]
pub(crate) struct PieceBody<'a> {
    pub numero_processo: &'a str,
    pub id_peca: &'a str,
    pub sistema: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PieceReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub formato: Option<String>,
    #[serde(default)]
    pub tamanho_bytes: Option<Value>,
    #[serde(default)]
    pub conteudo_disponivel: bool,
    #[serde(default)]
    pub texto_extraido: Option<String>,
    #[serde(default)]
    pub mensagem: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<PieceReply> for PieceContent {
    fn from(reply: PieceReply) -> Self {
        Self {
            format: reply.formato,
            size_bytes: lenient_size(reply.tamanho_bytes.as_ref()),
            content_available: reply.conteudo_disponivel,
            extracted_text: reply.texto_extraido,
            message: reply.mensagem,
        }
    }
}

// --- Generation ---

#[derive(Debug, Serialize)]
pub(crate) struct WireFragment<'a> {
    pub nome: &'a str,
    pub conteudo: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateBody<'a> {
    pub numero_processo: &'a str,
    pub objetivo: &'static str,
    pub pecas_processuais: Vec<WireFragment<'a>>,
    pub prompt_id: Option<&'a str>,
    pub ai_model_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub como_decidir: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamentos: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vedacoes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrucoes_adicionais: Option<&'a str>,
}

impl<'a> From<&'a GenerationRequest> for GenerateBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        let mut body = Self {
            numero_processo: request.process.as_ref().map_or("", |p| p.digits()),
            objetivo: request.objective.as_str(),
            pecas_processuais: request
                .fragments
                .iter()
                .map(|f| WireFragment {
                    nome: &f.label,
                    conteudo: &f.content,
                })
                .collect(),
            prompt_id: request.prompt_id.as_deref(),
            ai_model_id: request.model_id.as_deref(),
            como_decidir: None,
            fundamentos: None,
            vedacoes: None,
            instrucoes_adicionais: None,
        };

        match &request.fields {
            ObjectiveFields::Decision {
                how_to_decide,
                grounds,
                restrictions,
            } => {
                body.como_decidir = Some(how_to_decide.as_str());
                body.fundamentos = Some(grounds.as_str());
                body.vedacoes = Some(restrictions.as_str());
            }
            ObjectiveFields::Instructions { extra_instructions } => {
                body.instrucoes_adicionais = Some(extra_instructions.as_str());
            }
        }
        body
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdjustBody<'a> {
    #[serde(flatten)]
    pub base: GenerateBody<'a>,
    pub adjustment_prompt: &'a str,
    pub current_content: &'a str,
    pub model_id: Option<&'a str>,
}

impl<'a> From<&'a AdjustmentRequest> for AdjustBody<'a> {
    fn from(request: &'a AdjustmentRequest) -> Self {
        let mut base = GenerateBody::from(&request.base);
        base.objetivo = request.objective.as_str();
        Self {
            base,
            adjustment_prompt: &request.adjustment_prompt,
            current_content: &request.current_content,
            model_id: request.model_id.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateReply {
    #[serde(default)]
    pub minuta: Option<String>,
    #[serde(default)]
    pub resultado: Option<String>,
    #[serde(default)]
    pub tokens_info: Option<TokensInfo>,
    #[serde(default)]
    pub cost_info: Option<CostInfo>,
    #[serde(default)]
    pub user_cost: Option<String>,
}

impl GenerateReply {
    /// `None` when the service answered without any text.
    pub fn into_response(self) -> Option<GenerationResponse> {
        let text = self
            .minuta
            .into_iter()
            .chain(self.resultado)
            .find(|text| !text.trim().is_empty())?;

        Some(GenerationResponse {
            text,
            tokens: self.tokens_info,
            cost: self.cost_info,
            user_cost: self.user_cost,
        })
    }
}

/// Error body of a non-2xx reply.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorReply {
    pub error: String,
}

// --- Catalog ---

#[derive(Debug, Deserialize)]
pub(crate) struct ModelsReply {
    #[serde(default)]
    pub models: Vec<minuta_core::ModelInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DefaultModelReply {
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl DefaultModelReply {
    pub fn into_id(self) -> Option<String> {
        self.default_model
            .or(self.id)
            .filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromptsReply {
    #[serde(default)]
    pub prompts: Vec<WirePrompt>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePrompt {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ai_model: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl From<WirePrompt> for PromptInfo {
    fn from(prompt: WirePrompt) -> Self {
        Self {
            id: prompt.id,
            name: prompt.name,
            model: prompt.ai_model.filter(|m| !m.is_empty()),
            is_default: prompt.is_default,
        }
    }
}
