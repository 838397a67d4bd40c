//! BackendClient against an in-process axum server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use minuta_client::BackendClient;
use minuta_core::{
    AdjustmentRequest, FetchError, FragmentId, GenerationCatalog, GenerationError,
    GenerationRequest, GenerationService, MovementRequest, MovementSource, Objective,
    ObjectiveFields, PieceContentSource, PieceRequest, ProcessNumber, SubmittedFragment,
};
use serde_json::{Value, json};

type Received = Arc<Mutex<Vec<(String, Value)>>>;

async fn serve(app: Router) -> BackendClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    BackendClient::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap()
}

fn record(received: &Received, path: &str, body: Value) {
    received.lock().unwrap().push((path.to_string(), body));
}

fn process() -> ProcessNumber {
    ProcessNumber::parse("0000001-00.2024.0.00.0000").unwrap()
}

fn movement_request() -> MovementRequest {
    MovementRequest {
        process: process(),
        system_id: "br.jus.jfrj.eproc".into(),
    }
}

fn piece_request(id: &str) -> PieceRequest {
    PieceRequest {
        process: process(),
        piece_id: FragmentId::from(id),
        system_id: "br.jus.jfrj.eproc".into(),
    }
}

fn generation_request() -> GenerationRequest {
    GenerationRequest {
        process: Some(process()),
        objective: Objective::Minuta,
        fragments: vec![
            SubmittedFragment {
                label: "Inicial".into(),
                content: "Evento: 1 (10/01/2024 09:30)\n\nPedido.".into(),
            },
            SubmittedFragment {
                label: "Notas".into(),
                content: "Julgar procedente.".into(),
            },
        ],
        prompt_id: Some("3".into()),
        model_id: Some("gemini-2.5-pro".into()),
        fields: ObjectiveFields::Decision {
            how_to_decide: "Procedente".into(),
            grounds: "Art. 5º".into(),
            restrictions: String::new(),
        },
    }
}

// ── Case record ──

#[tokio::test]
async fn movements_are_posted_and_converted() {
    let received = Received::default();
    let app = Router::new()
        .route(
            "/api/buscar_movimentos",
            post(|State(rx): State<Received>, Json(body): Json<Value>| async move {
                record(&rx, "movimentos", body);
                Json(json!({
                    "success": true,
                    "movimentos": [
                        {
                            "evento": 1,
                            "data": "20240110093000",
                            "descricao": "Distribuição",
                            "pecas": [{
                                "id": 5501,
                                "descricao": "INIC1",
                                "tipo": "PDF",
                                "mimetype": "application/pdf",
                                "rotulo": "Petição inicial",
                                "tamanho": 1536,
                                "data": "20240110093000"
                            }]
                        },
                        {"evento": "2", "data": "20240111", "descricao": "Conclusos", "pecas": []}
                    ]
                }))
            }),
        )
        .with_state(received.clone());
    let client = serve(app).await;

    let events = client.fetch_movements(movement_request()).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_id, "1");
    let piece = &events[0].pieces[0];
    assert_eq!(piece.id.as_str(), "5501");
    assert_eq!(piece.display_label(), "Petição inicial");
    assert_eq!(piece.size, Some(1536));
    assert!(!events[1].has_pieces());

    let calls = received.lock().unwrap();
    assert_eq!(
        calls[0].1,
        json!({"numero_processo": "00000010020240000000", "sistema": "br.jus.jfrj.eproc"})
    );
}

#[tokio::test]
async fn unsuccessful_reply_is_rejected_with_service_text() {
    let app = Router::new().route(
        "/api/buscar_movimentos",
        post(|| async { Json(json!({"success": false, "error": "Processo não encontrado"})) }),
    );
    let client = serve(app).await;

    let err = client.fetch_movements(movement_request()).await.unwrap_err();
    assert!(matches!(err, FetchError::Rejected(ref m) if m == "Processo não encontrado"));
}

#[tokio::test]
async fn server_error_maps_to_remote() {
    let app = Router::new().route(
        "/api/buscar_conteudo_peca",
        post(|| async {
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "eproc indisponível"})),
            )
        }),
    );
    let client = serve(app).await;

    let err = client.fetch_piece(piece_request("p1")).await.unwrap_err();
    match err {
        FetchError::Remote {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 502);
            assert_eq!(message, "eproc indisponível");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn piece_content_is_converted() {
    let received = Received::default();
    let app = Router::new()
        .route(
            "/api/buscar_conteudo_peca",
            post(|State(rx): State<Received>, Json(body): Json<Value>| async move {
                record(&rx, "peca", body);
                Json(json!({
                    "success": true,
                    "formato": "pdf",
                    "tamanho_bytes": 2048,
                    "conteudo_disponivel": true,
                    "texto_extraido": "Excelentíssimo Senhor Juiz",
                    "mensagem": null
                }))
            }),
        )
        .with_state(received.clone());
    let client = serve(app).await;

    let content = client.fetch_piece(piece_request("5501")).await.unwrap();
    assert_eq!(content.format.as_deref(), Some("pdf"));
    assert_eq!(content.size_bytes, Some(2048));
    assert_eq!(content.text(), Some("Excelentíssimo Senhor Juiz"));

    let calls = received.lock().unwrap();
    assert_eq!(calls[0].1["id_peca"], "5501");
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let app = Router::new().route("/api/buscar_movimentos", post(|| async { "not json" }));
    let client = serve(app).await;

    let err = client.fetch_movements(movement_request()).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = client.fetch_movements(movement_request()).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

// ── Generation ──

#[tokio::test]
async fn generate_sends_ordered_fragments() {
    let received = Received::default();
    let app = Router::new()
        .route(
            "/generate_minuta",
            post(|State(rx): State<Received>, Json(body): Json<Value>| async move {
                record(&rx, "generate", body);
                Json(json!({
                    "minuta": "Vistos. JULGO PROCEDENTE.",
                    "tokens_info": {
                        "request_tokens": 120,
                        "response_tokens": 30,
                        "total_tokens": 150,
                        "model_used": "gemini-2.5-pro",
                        "success": true
                    },
                    "cost_info": {"total_cost_usd": "$0.0200"}
                }))
            }),
        )
        .with_state(received.clone());
    let client = serve(app).await;

    let response = client.generate(generation_request()).await.unwrap();
    assert_eq!(response.text, "Vistos. JULGO PROCEDENTE.");
    assert_eq!(response.tokens.as_ref().unwrap().total_tokens, 150);
    assert_eq!(response.cost_display(5.5).as_deref(), Some("R$ 0,11"));

    let calls = received.lock().unwrap();
    let body = &calls[0].1;
    assert_eq!(body["objetivo"], "minuta");
    assert_eq!(body["pecas_processuais"][0]["nome"], "Inicial");
    assert_eq!(body["pecas_processuais"][1]["conteudo"], "Julgar procedente.");
    assert_eq!(body["ai_model_id"], "gemini-2.5-pro");
    assert_eq!(body["como_decidir"], "Procedente");
}

#[tokio::test]
async fn adjust_posts_current_content() {
    let received = Received::default();
    let app = Router::new()
        .route(
            "/adjust_minuta",
            post(|State(rx): State<Received>, Json(body): Json<Value>| async move {
                record(&rx, "adjust", body);
                Json(json!({"resultado": "Vistos. Texto ajustado.", "user_cost": "R$ 0,12"}))
            }),
        )
        .with_state(received.clone());
    let client = serve(app).await;

    let request = AdjustmentRequest {
        base: generation_request(),
        objective: Objective::Minuta,
        adjustment_prompt: "Mais conciso".into(),
        current_content: "Vistos. JULGO PROCEDENTE.".into(),
        model_id: Some("o3-2025-04-16".into()),
    };
    let response = client.adjust(request).await.unwrap();
    assert_eq!(response.text, "Vistos. Texto ajustado.");
    assert_eq!(response.cost_display(5.5).as_deref(), Some("R$ 0,12"));

    let calls = received.lock().unwrap();
    let body = &calls[0].1;
    assert_eq!(body["adjustment_prompt"], "Mais conciso");
    assert_eq!(body["current_content"], "Vistos. JULGO PROCEDENTE.");
    assert_eq!(body["model_id"], "o3-2025-04-16");
    assert_eq!(body["pecas_processuais"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn service_error_carries_message() {
    let app = Router::new().route(
        "/generate_minuta",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Cota excedida"})),
            )
        }),
    );
    let client = serve(app).await;

    let err = client.generate(generation_request()).await.unwrap_err();
    match err {
        GenerationError::Service {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "Cota excedida");
        }
        other => panic!("expected Service, got {other:?}"),
    }
}

#[tokio::test]
async fn reply_without_text_is_empty_result() {
    let app = Router::new().route(
        "/generate_minuta",
        post(|| async { Json(json!({"tokens_info": {"total_tokens": 10}})) }),
    );
    let client = serve(app).await;

    let err = client.generate(generation_request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResult));
}

// ── Catalog ──

#[tokio::test]
async fn catalog_endpoints() {
    let app = Router::new()
        .route(
            "/api/available_models",
            get(|| async {
                Json(json!({"models": [
                    {"id": "gemini-2.5-pro", "name": "Gemini 2.5 Pro"},
                    {"id": "legacy", "name": "Legacy", "status": "inactive"}
                ]}))
            }),
        )
        .route(
            "/api/default_model",
            get(|| async { Json(json!({"id": "gemini-2.5-pro"})) }),
        )
        .route(
            "/api/prompts/{objective}",
            get(|Path(objective): Path<String>| async move {
                Json(json!({"prompts": [
                    {"id": 1, "name": format!("Padrão {objective}"), "ai_model": "", "is_default": true},
                    {"id": "2", "name": "Detalhado", "ai_model": "o3-2025-04-16", "is_default": false}
                ]}))
            }),
        );
    let client = serve(app).await;

    let models = client.list_models().await.unwrap();
    assert_eq!(models.len(), 2);
    assert!(!models[1].is_active());

    assert_eq!(client.default_model().await.unwrap(), "gemini-2.5-pro");

    let prompts = client.prompts_for(Objective::Report).await.unwrap();
    assert_eq!(prompts[0].id, "1");
    assert_eq!(prompts[0].name, "Padrão relatorio");
    assert!(prompts[0].model.is_none());
    assert!(prompts[0].is_default);
    assert_eq!(prompts[1].model.as_deref(), Some("o3-2025-04-16"));
}

#[tokio::test]
async fn missing_default_model_is_an_error() {
    let app = Router::new().route("/api/default_model", get(|| async { Json(json!({})) }));
    let client = serve(app).await;

    assert!(client.default_model().await.is_err());
}
