//! `minuta models`: models and prompts offered by the backend.

use minuta_core::Objective;
use minuta_draft::{ModelChoices, PromptChoices};

use super::connect;

pub async fn run(objective: Objective) -> Result<(), Box<dyn std::error::Error>> {
    let (config, client) = connect()?;

    let models = ModelChoices::load(client.as_ref(), &config.generation).await;
    let prompts = PromptChoices::load(client.as_ref(), objective).await;

    println!();
    if models.is_fallback() {
        println!("  Modelos (lista local, serviço indisponível):");
    } else {
        println!("  Modelos:");
    }
    for model in models.options() {
        let marker = if models.selected() == Some(model.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("   {marker} {:<30} {}", model.id, model.name);
    }

    println!();
    println!("  Prompts para {objective}:");
    if prompts.is_empty() {
        println!("     (nenhum)");
    }
    let selected = prompts.selected().map(|p| p.id.as_str());
    for prompt in prompts.prompts() {
        let marker = if selected == Some(prompt.id.as_str()) {
            "*"
        } else {
            " "
        };
        match &prompt.model {
            Some(model) => println!("   {marker} {:<6} {} [{model}]", prompt.id, prompt.name),
            None => println!("   {marker} {:<6} {}", prompt.id, prompt.name),
        }
    }
    println!();

    Ok(())
}
