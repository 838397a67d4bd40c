//! `minuta preview`: show the text extracted from one piece.

use minuta_core::{FragmentId, ProcessNumber};
use minuta_draft::{ImportReconciler, PiecePreview};

use super::connect;

pub async fn run(process: ProcessNumber, piece: String) -> Result<(), Box<dyn std::error::Error>> {
    let (config, client) = connect()?;
    let reconciler = ImportReconciler::new(client, &config.eproc.system_id);

    let preview = reconciler
        .preview(&process, &FragmentId::from(piece.as_str()))
        .await
        .map_err(|e| format!("Erro ao buscar conteúdo da peça: {e}"))?;

    print!("{}", render(&preview));
    Ok(())
}

fn render(preview: &PiecePreview) -> String {
    let mut out = format!("\n  Peça {}\n", preview.id);
    if let Some(format) = &preview.format {
        out.push_str(&format!("  Formato:    {format}\n"));
    }
    if let Some(size) = &preview.size {
        out.push_str(&format!("  Tamanho:    {size}\n"));
    }
    out.push_str(&format!(
        "  Conteúdo:   {}\n\n",
        if preview.available { "disponível" } else { "indisponível" }
    ));

    match (&preview.text, &preview.message) {
        (Some(text), _) => out.push_str(&format!("{text}\n")),
        (None, Some(message)) => out.push_str(&format!("  {message}\n")),
        (None, None) => out.push_str("  Nenhum texto extraído.\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(text: Option<&str>, message: Option<&str>) -> PiecePreview {
        PiecePreview {
            id: FragmentId::from("5501"),
            format: Some("pdf".into()),
            size: Some("2 KB".into()),
            available: text.is_some(),
            text: text.map(String::from),
            message: message.map(String::from),
        }
    }

    #[test]
    fn text_is_printed_after_header() {
        let out = render(&preview(Some("Vistos."), None));
        assert!(out.contains("Peça 5501"));
        assert!(out.contains("Tamanho:    2 KB"));
        assert!(out.ends_with("Vistos.\n"));
    }

    #[test]
    fn service_message_replaces_missing_text() {
        let out = render(&preview(None, Some("Documento digitalizado")));
        assert!(out.contains("indisponível"));
        assert!(out.contains("Documento digitalizado"));

        let bare = render(&preview(None, None));
        assert!(bare.contains("Nenhum texto extraído."));
    }
}
