use clap::Parser;
use tokio_util::sync::CancellationToken;

use rusty_podcast::conversation::{Conversation, Persona};
use rusty_podcast::{Ollama, OllamaError, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Ultra-simple podcast conversation demo.
#[derive(Parser, Debug)]
#[command(name = "rusty_podcast", version)]
#[command(about = "Simulates a two-person podcast conversation against a local Ollama server")]
struct Args {
    /// Conversation topic
    #[clap(long, default_value = "AI and the future")]
    topic: String,

    /// Host name
    #[clap(long, default_value = "Joe Rogan")]
    host_name: String,

    /// Host personality description
    #[clap(
        long,
        default_value = "Curious interviewer who asks direct questions and shares personal experiences"
    )]
    host_personality: String,

    /// Guest name
    #[clap(long, default_value = "Alex Chen")]
    guest_name: String,

    /// Guest personality description
    #[clap(
        long,
        default_value = "Tech entrepreneur with strong opinions about AI and the future"
    )]
    guest_personality: String,

    /// Language model to use
    #[clap(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Conversation language (English, Spanish, French, etc.)
    #[clap(long, default_value = "English")]
    language: String,

    /// Number of recent turns to include in each prompt
    #[clap(long, default_value_t = 10)]
    history: usize,

    /// Base URL of the Ollama server
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), OllamaError> {
    env_logger::init();
    let args = Args::parse();

    let llm = Ollama::new(args.url.as_str(), args.model.as_str())?;

    // Best effort: the conversation still starts if the listing fails.
    match llm.list_models().await {
        Ok(models) if !models.iter().any(|m| m == &llm.model) => {
            log::warn!(
                "model {:?} not found on {} (available: {})",
                llm.model,
                args.url,
                models.join(", ")
            );
        }
        Ok(models) => log::info!("server has {} models", models.len()),
        Err(err) => log::warn!("could not list models: {err}"),
    }

    let host = Persona::new(args.host_name, args.host_personality);
    let guest = Persona::new(args.guest_name, args.guest_personality);

    println!("\n=== Podcast: {} ===", args.topic);
    println!("Model: {}", llm.model);
    println!("Language: {}", args.language);
    println!("Participants: {} (host), {} (guest)", host.name, guest.name);
    println!("Host: {}", host.personality);
    println!("Guest: {}", guest.personality);
    println!("Press Ctrl+C to stop\n");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut conversation = Conversation::new(args.topic, args.language, host, guest, args.history);
    conversation.run(&llm, &cancel).await?;

    println!("\nConversation ended after {} turns.", conversation.turns());
    Ok(())
}
