//! Command-line host: query imagery for a location and read index values
//! from its rendered layers.

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

#[cfg(not(target_arch = "wasm32"))]
use satview::LayerKind;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "satview", version, about = "Query satellite imagery and read spectral indices")]
struct Args {
    /// Location to query, e.g. "Lahore, Pakistan"
    location: String,

    /// Layer to sample (rgb, ndvi, ndbi)
    #[arg(short, long, default_value = "ndvi")]
    layer: LayerKind,

    /// Pixel to sample as X,Y in native image coordinates (repeatable)
    #[arg(long = "at", value_parser = parse_point)]
    points: Vec<(f64, f64)>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Do not read or write the persisted location history
    #[arg(long)]
    no_history: bool,

    /// Write the effective configuration back to the configuration file
    #[arg(long)]
    save_config: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad X in '{}': {}", s, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad Y in '{}': {}", s, e))?;
    Ok((x, y))
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    use satview::history::FileHistoryStore;
    use satview::raster::resolve_asset_url;
    use satview::{
        AppConfig, HistoryStore, HttpImageryClient, MemoryHistoryStore, RasterCache,
        SessionState, Viewport, sampler,
    };

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load_or_default(),
    };

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if args.save_config {
        match args.config.clone().or_else(AppConfig::default_path) {
            Some(path) => config.save_to_path(&path)?,
            None => log::warn!("No configuration directory available, not saving"),
        }
    }

    let client = HttpImageryClient::new(&config.backend)?;

    let store: Box<dyn HistoryStore> = match FileHistoryStore::default_path() {
        Some(path) if !args.no_history => Box::new(FileHistoryStore::new(path)),
        _ => Box::new(MemoryHistoryStore::new()),
    };
    let mut session =
        SessionState::with_history_limit(store, config.preferences.effective_history_limit());
    session.restore_history();
    session.set_location_input(args.location.as_str());

    let outcome = match session.query(&client, &args.location).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::debug!("Query failed: {}", e);
            anyhow::bail!("{}", e.user_message());
        }
    };
    let Some(result) = outcome.result().cloned() else {
        println!("Nothing to query: location is empty");
        return Ok(());
    };

    println!("Imagery for {} ({})", result.location, result.date);
    if let Some(coords) = result.coords {
        println!("  centre: {:.4}, {:.4}", coords.lat, coords.lon);
    }
    for layer in LayerKind::ALL {
        let url = resolve_asset_url(client.origin(), result.layer_path(layer))?;
        println!("  {:<5} {}", layer.label(), url);
    }
    let download = resolve_asset_url(client.origin(), &result.download_url)?;
    println!("  GeoTIFF {}", download);

    println!("Recent queries:");
    for (i, location) in session.history().entries().iter().enumerate() {
        println!("  {}. {}", i + 1, location);
    }

    if args.points.is_empty() {
        return Ok(());
    }

    session.select_layer(args.layer);
    let mut rasters = RasterCache::new();
    let buffer = rasters
        .ensure_loaded(&client, client.origin(), &args.location, &result, args.layer)
        .await?;

    println!(
        "{} ({}x{})",
        args.layer.title(),
        buffer.width(),
        buffer.height()
    );
    for (x, y) in &args.points {
        let reading = sampler::sample(buffer, args.layer, &Viewport::native(), *x, *y);
        let Some((px, py)) = reading.pixel else {
            println!("  ({}, {})  not mappable", x, y);
            continue;
        };
        match (reading.channels, reading.index_value) {
            (Some(rgb), Some(value)) => println!(
                "  X: {}, Y: {}  rgb({}, {}, {})  {}: {:.2}",
                px,
                py,
                rgb.r,
                rgb.g,
                rgb.b,
                args.layer.label(),
                value
            ),
            (Some(rgb), None) => {
                println!("  X: {}, Y: {}  rgb({}, {}, {})", px, py, rgb.r, rgb.g, rgb.b)
            }
            _ => println!("  X: {}, Y: {}  outside image", px, py),
        }
    }

    Ok(())
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("12,40"), Ok((12.0, 40.0)));
        assert_eq!(parse_point(" 3.5 , 7 "), Ok((3.5, 7.0)));
        assert!(parse_point("12").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["satview", "Lahore, Pakistan", "-l", "ndbi", "--at", "1,2"]);
        assert_eq!(args.location, "Lahore, Pakistan");
        assert_eq!(args.layer, LayerKind::Ndbi);
        assert_eq!(args.points, vec![(1.0, 2.0)]);
        assert!(!args.no_history);
        assert!(!args.save_config);
    }

    #[test]
    fn test_args_save_config() {
        let args = Args::parse_from(["satview", "Lahore", "--save-config", "--config", "c.json"]);
        assert!(args.save_config);
        assert_eq!(args.config, Some(std::path::PathBuf::from("c.json")));
    }
}
