use anyhow::Result;
use obox_llm::{
    AnimationConfig, AnimationOutcome, CancellationToken, ContentGenerator, GeminiClient,
    GenerateRequest, ResponseAnimator, Turn, DEFAULT_MODEL,
};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    let api_key = std::env::var("GEMINI_API_KEY")?;
    let client = GeminiClient::new(Some(api_key))?;

    let request = GenerateRequest::new(
        DEFAULT_MODEL,
        "Answer briefly.",
        vec![Turn::user("What is retrieval-augmented generation?")],
    );

    let cancel = CancellationToken::new();
    let fragments = client.generate_stream(request, cancel.clone()).await?;

    let animator = ResponseAnimator::new(AnimationConfig::default());
    let outcome = animator
        .run(fragments, &cancel, |_, fresh| {
            print!("{}", fresh);
            let _ = std::io::stdout().flush();
        })
        .await;

    match outcome {
        AnimationOutcome::Completed { text } => println!("\n\n[{} chars]", text.chars().count()),
        AnimationOutcome::Failed { error, .. } => eprintln!("\nGeneration failed: {}", error),
        AnimationOutcome::Cancelled { .. } => eprintln!("\nCancelled"),
    }

    Ok(())
}
