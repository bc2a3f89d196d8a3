use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_theory_rag::application::{AnswerComposer, Assistant, DocumentService, IndexBuilder};
use music_theory_rag::domain::Session;
use music_theory_rag::infrastructure::{
    gemini_client, index_store_for, ApiCredential, AppConfig, GeminiEmbedding, GeminiLlm,
    MultiFormatLoader,
};

const CREDENTIAL_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "music_theory_rag=info,chat=info".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config_path =
        PathBuf::from(std::env::var("RAG_CONFIG").unwrap_or_else(|_| "config.yaml".into()));
    let mut config = AppConfig::load(&config_path)?;
    if let Some(document) = std::env::args_os().nth(1) {
        config.document.path = PathBuf::from(document);
    }

    let credential = ApiCredential::from_env(CREDENTIAL_VARS)?;
    let client = gemini_client(&credential)?;

    let embedding = Arc::new(GeminiEmbedding::new(client.clone(), &config.embedding));
    let llm = Arc::new(GeminiLlm::new(client, &config.llm));
    let store = index_store_for(&config.index, config.embedding.dimension)?;
    info!(backend = ?config.index.backend, "index store selected");

    let builder = IndexBuilder::new(
        DocumentService::new(Arc::new(MultiFormatLoader::new()), config.chunking),
        embedding,
        store,
        config.retrieval.top_k,
    );
    let retriever = builder
        .build_index(&config.document.path)
        .await
        .with_context(|| format!("preparing index for {}", config.document.path.display()))?;
    info!(entries = retriever.index().len(), "index ready");

    let composer = AnswerComposer::new(llm, config.prompts.clone())
        .with_min_score(config.retrieval.min_score);
    let assistant = Assistant::new(retriever, composer, config.messages.clone());

    let mut session = Session::new();
    repl(&assistant, &mut session).await
}

async fn repl(assistant: &Assistant, session: &mut Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Müzik teorisi asistanı hazır. Geçmiş için /history, çıkmak için /quit.");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        match question {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                print_history(session);
                continue;
            }
            _ => {}
        }

        let outcome = assistant.ask_question(session, question).await;
        if let Some(turn) = session.history().last() {
            println!("\n{}\n", turn.content);
        }
        if let Err(e) = outcome {
            if e.is_fatal() {
                return Err(e.into());
            }
        }
    }

    info!(session_id = %session.id, turns = session.len(), "session closed");
    Ok(())
}

fn print_history(session: &Session) {
    for turn in session.history() {
        println!("[{}] {}\n", turn.role.as_str(), turn.content);
    }
}
