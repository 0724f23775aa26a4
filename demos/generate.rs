use rusty_podcast::Ollama;
use rusty_podcast::OllamaError;

#[tokio::main]
async fn main() -> Result<(), OllamaError> {
    let ollama = Ollama::create_default()?;

    // Echoes the reply to stdout as it streams in.
    let text = ollama.generate("Why is the sky blue?", true).await?;

    eprintln!("\n({} characters)", text.len());
    Ok(())
}
