//! Generation collaborators: the service that turns an ordered set of
//! fragments into a draft, and the catalog of models and prompts it offers.
//!
//! The drafting session calls `generate()` / `adjust()` without knowing how
//! the service is reached.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::fragment::Fragment;
use crate::process::ProcessNumber;

/// What kind of text to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Objective {
    /// A draft decision
    #[default]
    #[serde(rename = "minuta")]
    Minuta,
    #[serde(rename = "resumo")]
    Summary,
    #[serde(rename = "relatorio")]
    Report,
}

impl Objective {
    /// Wire name of the objective.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minuta => "minuta",
            Self::Summary => "resumo",
            Self::Report => "relatorio",
        }
    }

    /// Label of the submit action.
    pub fn action_label(self) -> &'static str {
        match self {
            Self::Minuta => "Gerar Minuta",
            Self::Summary => "Gerar Resumo",
            Self::Report => "Gerar Relatório",
        }
    }

    /// Title of the generated result.
    pub fn result_title(self) -> &'static str {
        match self {
            Self::Minuta => "Minuta Gerada",
            Self::Summary => "Resumo Gerado",
            Self::Report => "Relatório Gerado",
        }
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minuta" => Ok(Self::Minuta),
            "resumo" | "summary" => Ok(Self::Summary),
            "relatorio" | "report" => Ok(Self::Report),
            other => Err(format!("unknown objective: {other}")),
        }
    }
}

/// Objective-specific form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectiveFields {
    /// Fields of a draft decision. `how_to_decide` is required.
    Decision {
        how_to_decide: String,
        #[serde(default)]
        grounds: String,
        #[serde(default)]
        restrictions: String,
    },
    /// Free instructions for summaries and reports.
    Instructions {
        #[serde(default)]
        extra_instructions: String,
    },
}

/// A fragment as sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedFragment {
    pub label: String,
    pub content: String,
}

impl From<&Fragment> for SubmittedFragment {
    fn from(fragment: &Fragment) -> Self {
        Self {
            label: fragment.label.clone(),
            content: fragment.content.clone(),
        }
    }
}

/// A generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessNumber>,

    pub objective: Objective,

    /// Fragments in submission order
    pub fragments: Vec<SubmittedFragment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    pub fields: ObjectiveFields,
}

/// A request to refine previously generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    /// The submission that produced the base draft
    pub base: GenerationRequest,

    pub objective: Objective,

    /// What to change
    pub adjustment_prompt: String,

    /// The text being adjusted
    pub current_content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

/// Token usage reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensInfo {
    #[serde(default)]
    pub request_tokens: u32,
    #[serde(default)]
    pub response_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub success: bool,
}

/// Cost reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostInfo {
    /// Formatted like `"$0.0123"`
    #[serde(default)]
    pub total_cost_usd: Option<String>,
}

impl CostInfo {
    /// The USD cost converted to a BRL display string (`"R$ 0,07"`).
    pub fn display_brl(&self, usd_to_brl: f64) -> Option<String> {
        let usd: f64 = self
            .total_cost_usd
            .as_deref()?
            .trim()
            .trim_start_matches('$')
            .parse()
            .ok()?;
        let brl = format!("{:.2}", usd * usd_to_brl).replace('.', ",");
        Some(format!("R$ {brl}"))
    }
}

/// A generated (or adjusted) text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,

    #[serde(default)]
    pub tokens: Option<TokensInfo>,

    #[serde(default)]
    pub cost: Option<CostInfo>,

    /// Pre-formatted cost for the user, when the service computes one
    #[serde(default)]
    pub user_cost: Option<String>,
}

impl GenerationResponse {
    /// Cost to show: the service's own figure, else the converted USD cost.
    pub fn cost_display(&self, usd_to_brl: f64) -> Option<String> {
        self.user_cost
            .clone()
            .or_else(|| self.cost.as_ref()?.display_brl(usd_to_brl))
    }
}

/// A model offered by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: None,
            status: None,
        }
    }

    /// Models are active unless explicitly marked otherwise.
    pub fn is_active(&self) -> bool {
        self.active != Some(false) && self.status.as_deref() != Some("inactive")
    }
}

/// A prompt template registered for an objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInfo {
    pub id: String,
    pub name: String,

    /// Model the prompt is tuned for
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub is_default: bool,
}

/// The generation service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a draft from an ordered set of fragments.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError>;

    /// Refine a previously generated draft.
    async fn adjust(
        &self,
        request: AdjustmentRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError>;
}

/// Models and prompts offered by the generation service.
#[async_trait]
pub trait GenerationCatalog: Send + Sync {
    async fn list_models(&self) -> std::result::Result<Vec<ModelInfo>, GenerationError>;

    /// The service-wide default model id.
    async fn default_model(&self) -> std::result::Result<String, GenerationError>;

    /// Prompts available for an objective.
    ///
    /// Default implementation offers none.
    async fn prompts_for(
        &self,
        _objective: Objective,
    ) -> std::result::Result<Vec<PromptInfo>, GenerationError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_wire_names() {
        let json = serde_json::to_string(&Objective::Report).unwrap();
        assert_eq!(json, "\"relatorio\"");
        assert_eq!("resumo".parse::<Objective>().unwrap(), Objective::Summary);
        assert!("parecer".parse::<Objective>().is_err());
    }

    #[test]
    fn objective_texts() {
        assert_eq!(Objective::Minuta.action_label(), "Gerar Minuta");
        assert_eq!(Objective::Summary.result_title(), "Resumo Gerado");
    }

    #[test]
    fn usd_cost_converts_to_brl() {
        let cost = CostInfo {
            total_cost_usd: Some("$0.0200".into()),
        };
        assert_eq!(cost.display_brl(5.5).as_deref(), Some("R$ 0,11"));
    }

    #[test]
    fn unparseable_cost_is_hidden() {
        let cost = CostInfo {
            total_cost_usd: Some("n/a".into()),
        };
        assert!(cost.display_brl(5.5).is_none());
    }

    #[test]
    fn user_cost_wins_over_usd_cost() {
        let response = GenerationResponse {
            text: "Vistos.".into(),
            tokens: None,
            cost: Some(CostInfo {
                total_cost_usd: Some("$1.00".into()),
            }),
            user_cost: Some("R$ 4,20".into()),
        };
        assert_eq!(response.cost_display(5.5).as_deref(), Some("R$ 4,20"));
    }

    #[test]
    fn model_activity() {
        let mut model = ModelInfo::new("gemini-2.5-pro", "Gemini 2.5 Pro");
        assert!(model.is_active());
        model.status = Some("inactive".into());
        assert!(!model.is_active());
        model.status = None;
        model.active = Some(false);
        assert!(!model.is_active());
    }
}
