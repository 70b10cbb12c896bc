use cad_agent::{PipelineConfig, PipelineEvent, SubmitOutcome};
use cad_sdk::scene::{self, RasterSurface};
use dotenvy::dotenv;
use std::{env, error::Error, sync::Arc};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const DEFAULT_PROMPT: &str =
    "Design a 120 mm x 80 mm steel mounting plate, 6 mm thick, with four 8 mm holes 10 mm from each corner.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = env::args().skip(1).collect::<Vec<_>>().join(" ");
    let prompt = if prompt.trim().is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        prompt
    };

    let config = PipelineConfig::from_env()?;
    let (sender, mut events) = mpsc::unbounded_channel();
    let orchestrator = config.build_orchestrator(Arc::new(sender))?;

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PipelineEvent::Stage(status) => println!("[{}] {}", status.stage, status.message),
                PipelineEvent::Log(line) => println!("    {line}"),
                PipelineEvent::DesignSummary(summary) => {
                    println!("Design: {} - {}", summary.title, summary.description);
                    for dimension in summary.dimensions {
                        println!("    {}: {}", dimension.label, dimension.value);
                    }
                }
                PipelineEvent::Illustration(illustration) => {
                    println!("Illustration ready: {}", illustration.view_type.label());
                }
                PipelineEvent::IllustrationFailed { view_type, error } => {
                    println!("Illustration failed: {} ({error})", view_type.label());
                }
                PipelineEvent::IllustrationsSettled { delivered, failed } => {
                    println!("Illustrations: {delivered} delivered, {failed} failed");
                }
            }
        }
    });

    match orchestrator.submit(&prompt).await? {
        SubmitOutcome::NeedsClarification { analysis } => {
            println!("\n{analysis}");
        }
        SubmitOutcome::Drawing(drawing) => {
            println!("\n{}", drawing.stats);

            if let Some(download) = orchestrator.download().await {
                std::fs::write(&download.filename, &download.content)?;
                println!("Saved {}", download.filename);

                let mut surface = RasterSurface::new(1200, 800)?;
                if let Some(font) = config.load_preview_font()? {
                    surface = surface.with_font(RasterSurface::load_font(font)?);
                }
                scene::render(&download.content, &mut surface);
                let preview = download.filename.replace(".dxf", ".png");
                std::fs::write(&preview, surface.encode_png()?)?;
                println!("Saved {preview}");
            }
        }
    }

    orchestrator.wait_for_auxiliary().await;
    for illustration in orchestrator.illustrations() {
        let name = format!(
            "illustration-{}.png",
            illustration.view_type.label().to_lowercase().replace(' ', "-")
        );
        std::fs::write(&name, &illustration.image)?;
        println!("Saved {name}");
    }

    drop(orchestrator);
    printer.await?;
    Ok(())
}
