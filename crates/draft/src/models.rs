//! Model and prompt selection.
//!
//! Both lists come from the [`GenerationCatalog`]. When the catalog is
//! unreachable the configured fallback models are offered instead; prompts
//! have no fallback.

use minuta_config::GenerationConfig;
use minuta_core::{GenerationCatalog, ModelInfo, Objective, PromptInfo};
use tracing::{debug, warn};

/// Models offered for generation and the one currently selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChoices {
    options: Vec<ModelInfo>,
    default_id: Option<String>,
    selected: Option<String>,
    from_fallback: bool,
}

impl ModelChoices {
    /// Active catalog models with the catalog default preselected, or the
    /// configured fallback list when the catalog fails or offers nothing.
    pub async fn load(catalog: &dyn GenerationCatalog, config: &GenerationConfig) -> Self {
        let options: Vec<ModelInfo> = match catalog.list_models().await {
            Ok(models) => models.into_iter().filter(ModelInfo::is_active).collect(),
            Err(e) => {
                warn!(error = %e, "Model list unavailable, using fallback models");
                Vec::new()
            }
        };

        if options.is_empty() {
            return Self::fallback(config);
        }

        let default_id = match catalog.default_model().await {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(error = %e, "No default model from catalog");
                None
            }
        };

        let mut choices = Self {
            options,
            default_id,
            selected: None,
            from_fallback: false,
        };
        choices.select_default();
        choices
    }

    /// The configured fallback models and default.
    pub fn fallback(config: &GenerationConfig) -> Self {
        let mut choices = Self {
            options: config.fallback_models.clone(),
            default_id: Some(config.default_model.clone()),
            selected: None,
            from_fallback: true,
        };
        choices.select_default();
        choices
    }

    /// Select the default when listed, else the first option.
    pub fn select_default(&mut self) {
        self.selected = self
            .default_id
            .as_deref()
            .filter(|id| self.contains(id))
            .or_else(|| self.options.first().map(|m| m.id.as_str()))
            .map(String::from);
    }

    /// Select a listed model.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    /// Follow a prompt's preferred model when it is listed; otherwise fall
    /// back to the default. Returns whether the prompt's model was used.
    pub fn select_for_prompt(&mut self, model: Option<&str>) -> bool {
        match model {
            Some(id) if self.select(id) => true,
            _ => {
                self.select_default();
                false
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.options.iter().any(|m| m.id == id)
    }

    pub fn options(&self) -> &[ModelInfo] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn default_id(&self) -> Option<&str> {
        self.default_id.as_deref()
    }

    pub fn is_fallback(&self) -> bool {
        self.from_fallback
    }
}

/// Prompts registered for an objective.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptChoices {
    prompts: Vec<PromptInfo>,
    selected: Option<String>,
}

impl PromptChoices {
    /// Prompts for `objective`, with the default prompt preselected. A failed
    /// lookup yields no prompts.
    pub async fn load(catalog: &dyn GenerationCatalog, objective: Objective) -> Self {
        let prompts = match catalog.prompts_for(objective).await {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!(objective = %objective, error = %e, "Prompt list unavailable");
                Vec::new()
            }
        };

        let selected = prompts
            .iter()
            .find(|p| p.is_default)
            .or_else(|| prompts.first())
            .map(|p| p.id.clone());

        Self { prompts, selected }
    }

    pub fn prompts(&self) -> &[PromptInfo] {
        &self.prompts
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn select(&mut self, id: &str) -> bool {
        if !self.prompts.iter().any(|p| p.id == id) {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn selected(&self) -> Option<&PromptInfo> {
        let id = self.selected.as_deref()?;
        self.prompts.iter().find(|p| p.id == id)
    }
}
