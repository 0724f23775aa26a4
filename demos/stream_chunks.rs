use std::time::Duration;

use futures_util::pin_mut;
use futures_util::stream::StreamExt;
use rusty_podcast::{Ollama, OllamaError};

#[tokio::main]
async fn main() -> Result<(), OllamaError> {
    let ollama = Ollama::create_default()?;

    // Start a streaming request with a sample prompt.
    let stream = ollama
        .stream_generate("Why is the sky blue?", Duration::from_secs(600))
        .await?;
    // Pin the stream so that it can be used with the `next` method.
    pin_mut!(stream);

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                print!("{}", chunk.response);
                if chunk.done {
                    break;
                }
            }
            Err(err) => {
                eprintln!("\nError while streaming: {}", err);
                break;
            }
        }
    }
    println!();

    Ok(())
}
