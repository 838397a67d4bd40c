//! `minuta movements`: list the candidate pieces of a process.

use minuta_core::{CandidateRow, DraftError, Error, ProcessNumber, format_event_date, format_size};
use minuta_draft::CandidateStore;

use super::connect;

pub async fn run(
    process: ProcessNumber,
    page: usize,
    oldest_first: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, client) = connect()?;
    let page_size = config.candidates.page_size;

    let mut store = CandidateStore::new(&config.eproc.system_id);
    match store.load(&process, client.as_ref()).await {
        Ok(()) => {}
        Err(Error::Draft(DraftError::EmptyResult { .. })) => {
            println!("Nenhum movimento com peças encontrado para {process}.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    if oldest_first {
        store.toggle_order();
    }
    if !store.set_page(page, page_size) {
        return Err(format!(
            "Page {page} out of range (1-{})",
            store.page_count(page_size)
        )
        .into());
    }

    println!();
    println!("  Processo {process}");
    println!();
    for row in store.current_rows(page_size) {
        println!("  {}", render_row(&row));
    }
    println!();
    if let Some(info) = store.page_info(page, page_size) {
        println!("  {info} (página {} de {})", info.page, info.page_count);
    }

    Ok(())
}

fn render_row(row: &CandidateRow) -> String {
    let date = format_event_date(&row.date);
    match &row.piece {
        Some(piece) => {
            let size = piece.size.map(format_size).unwrap_or_default();
            format!(
                "{:<12} ev. {:<5} {}  {}  {}",
                piece.id.as_str(),
                row.event_id,
                date,
                piece.display_label(),
                size
            )
            .trim_end()
            .to_string()
        }
        None => format!(
            "{:<12} ev. {:<5} {}  {} (sem peças)",
            "-", row.event_id, date, row.description
        ),
    }
}
