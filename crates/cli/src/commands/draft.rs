//! `minuta draft`: import pieces, add notes and generate a draft.

use std::sync::Arc;

use clap::Args;
use minuta_core::{EventBus, FragmentId, Objective, ProcessNumber};
use minuta_draft::{
    CandidateStore, DocumentAssembler, DraftSession, GenerationForm, ImportReconciler,
    ModelChoices, Placement, PromptChoices, ReorderEngine,
};
use tracing::warn;

use super::{connect, log_events};

#[derive(Args)]
pub struct DraftArgs {
    /// Process number, with or without punctuation
    pub(crate) process: ProcessNumber,

    /// Piece to import (repeatable)
    #[arg(short, long = "piece", value_name = "ID")]
    pub(crate) pieces: Vec<String>,

    /// Import every piece of the process
    #[arg(long, conflicts_with = "pieces")]
    pub(crate) all_pieces: bool,

    /// Manual fragment as LABEL=TEXT; TEXT may be @FILE (repeatable)
    #[arg(short, long = "note", value_name = "LABEL=TEXT")]
    pub(crate) notes: Vec<String>,

    /// Place manual fragments before the imported pieces
    #[arg(long)]
    pub(crate) notes_first: bool,

    /// What to generate: minuta, resumo or relatorio
    #[arg(short, long, default_value = "minuta")]
    pub(crate) objective: Objective,

    /// How the case should be decided (minuta)
    #[arg(long, default_value = "")]
    pub(crate) how: String,

    /// Legal grounds to rely on (minuta)
    #[arg(long, default_value = "")]
    pub(crate) grounds: String,

    /// What the draft must not contain (minuta)
    #[arg(long, default_value = "")]
    pub(crate) restrictions: String,

    /// Free instructions (resumo, relatorio)
    #[arg(long, default_value = "")]
    pub(crate) instructions: String,

    /// Prompt id; defaults to the objective's default prompt
    #[arg(long)]
    pub(crate) prompt: Option<String>,

    /// Model id; defaults to the prompt's model or the service default
    #[arg(short, long)]
    pub(crate) model: Option<String>,

    /// Adjustment applied after generation (repeatable)
    #[arg(long = "adjust", value_name = "PROMPT")]
    pub(crate) adjustments: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub async fn run(args: DraftArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, client) = connect()?;
    let event_bus = Arc::new(EventBus::default());
    log_events(&event_bus);

    let mut store =
        CandidateStore::new(&config.eproc.system_id).with_event_bus(Arc::clone(&event_bus));
    let mut assembler = DocumentAssembler::new();

    // --- Imported pieces ---
    if args.all_pieces || !args.pieces.is_empty() {
        store.load(&args.process, client.as_ref()).await?;

        if args.all_pieces {
            let rows = store.rows();
            store.select_all(&rows);
        }
        for id in &args.pieces {
            if !store.select(&FragmentId::from(id.as_str())) {
                return Err(format!("Piece {id} is not part of process {}", args.process).into());
            }
        }

        let reconciler = ImportReconciler::new(client.clone(), &config.eproc.system_id)
            .with_event_bus(Arc::clone(&event_bus));
        let report = reconciler
            .import_selected(&args.process, &mut store, &mut assembler, |progress| {
                eprintln!("  {progress}")
            })
            .await;

        if !report.with_fallback.is_empty() {
            warn!(
                pieces = report.with_fallback.len(),
                "Some pieces were imported without extracted text"
            );
        }
    }

    // --- Manual fragments ---
    for (index, raw) in args.notes.iter().enumerate() {
        let (label, text) = parse_note(raw, index + 1);
        let text = read_note_text(text)?;
        let id = assembler.add_manual().id.clone();
        assembler.set_label(&id, label);
        assembler.set_content(&id, text);
    }

    if args.notes_first {
        place_notes_first(&mut assembler);
    }

    println!();
    println!("  Ordem de envio:");
    for line in assembler.order_preview()? {
        println!("   {line}");
    }
    println!();

    // --- Prompt and model ---
    let mut prompts = PromptChoices::load(client.as_ref(), args.objective).await;
    if let Some(prompt) = &args.prompt
        && !prompts.select(prompt)
    {
        return Err(format!("Unknown prompt {prompt} for {}", args.objective).into());
    }
    let mut models = ModelChoices::load(client.as_ref(), &config.generation).await;
    match &args.model {
        Some(model) if !models.select(model) => {
            return Err(format!("Model {model} is not available").into());
        }
        Some(_) => {}
        None => {
            models.select_for_prompt(prompts.selected().and_then(|p| p.model.as_deref()));
        }
    }

    let mut form = match args.objective {
        Objective::Minuta => GenerationForm::minuta(&args.how)
            .with_decision_details(&args.grounds, &args.restrictions),
        objective => GenerationForm::instructions(objective, &args.instructions),
    }
    .with_process(args.process.clone());
    if let Some(prompt) = prompts.selected() {
        form = form.with_prompt(&prompt.id);
    }
    if let Some(model) = models.selected() {
        form = form.with_model(model);
    }

    // --- Generation ---
    let mut session = DraftSession::new(client.clone(), &config.generation)
        .with_event_bus(Arc::clone(&event_bus));

    eprintln!("  Gerando...");
    let response = session.generate(&assembler, form).await?;
    let cost = session.cost_display(&response);

    for prompt in &args.adjustments {
        eprintln!("  Ajustando: {prompt}");
        session
            .adjust(prompt, models.selected().map(String::from))
            .await?;
    }

    if args.json {
        let output = serde_json::json!({
            "objective": args.objective,
            "text": response.text,
            "tokens": response.tokens,
            "cost": cost,
            "versions": session.versions(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("  ── {} ──", args.objective.result_title());
    println!();
    println!("{}", response.text);
    println!();
    if let Some(cost) = cost {
        println!("  Custo: {cost}");
    }

    for version in session.versions() {
        println!();
        println!("  ── Versão {} ({}) ──", version.number, version.adjustment_prompt);
        println!();
        println!("{}", version.content);
        if let Some(cost) = &version.cost {
            println!();
            println!("  Custo: {cost}");
        }
    }

    Ok(())
}

/// Split `LABEL=TEXT`; a note without a label is named after its position.
fn parse_note(raw: &str, position: usize) -> (String, &str) {
    match raw.split_once('=') {
        Some((label, text)) if !label.trim().is_empty() => (label.trim().to_string(), text),
        _ => (format!("Nota {position}"), raw),
    }
}

fn read_note_text(text: &str) -> Result<String, Box<dyn std::error::Error>> {
    match text.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read note file {path}: {e}").into()),
        None => Ok(text.to_string()),
    }
}

/// Move every manual fragment ahead of the first imported one, keeping the
/// notes in the order they were given.
fn place_notes_first(assembler: &mut DocumentAssembler) {
    let Some(anchor) = assembler.imported().first().map(|f| f.id.clone()) else {
        return;
    };
    let notes: Vec<FragmentId> = assembler
        .manual()
        .iter()
        .map(|f| f.id.clone())
        .collect();

    for id in notes {
        ReorderEngine::move_fragment(assembler, &id, Placement::Before(anchor.clone()));
    }
}
