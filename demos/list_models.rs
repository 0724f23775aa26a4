use rusty_podcast::Ollama;
use rusty_podcast::OllamaError;

#[tokio::main]
async fn main() -> Result<(), OllamaError> {
    let ollama = Ollama::create_default()?;

    match ollama.list_models().await {
        Ok(models) => {
            for name in models {
                println!("{name}");
            }
        }
        Err(err) => eprintln!("could not reach the server: {err}"),
    }

    Ok(())
}
