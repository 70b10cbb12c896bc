use cad_sdk::scene::{self, RasterSurface};
use dotenvy::dotenv;
use std::{env, error::Error, path::PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let input = PathBuf::from(args.next().ok_or("usage: preview <drawing.dxf> [output.png]")?);
    let output = args
        .next()
        .map_or_else(|| input.with_extension("png"), PathBuf::from);

    let text = std::fs::read_to_string(&input)?;
    let entities = scene::parse(&text);
    match scene::bounds(&entities) {
        Some(bounds) => println!("{} entities {bounds}", entities.len()),
        None => println!("No entities found"),
    }

    let mut surface = RasterSurface::new(1200, 800)?;
    if let Ok(path) = env::var("CAD_PREVIEW_FONT") {
        surface = surface.with_font(RasterSurface::load_font(std::fs::read(path)?)?);
    }
    scene::render_entities(&entities, &mut surface);
    std::fs::write(&output, surface.encode_png()?)?;
    println!("Saved {}", output.display());

    if env::var("CAD_PREVIEW_RAW").is_ok() {
        println!("\n{}", scene::raw_preview(&text));
    }
    Ok(())
}
