// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives

//cargo run --bin sorrel --release -- --booths booths/ac_112.csv --samples-per-ac 100 --ac-name "Shivajinagar" --ac-code 112

use anyhow::{Context, Result};
use booth_sampler::config::SamplingConfig;
use booth_sampler::loader::load_booths_csv;
use booth_sampler::map::{render_geojson, save_map};
use booth_sampler::process_constituency_with;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV of booths with latitude/longitude columns
    #[arg(short, long)]
    booths: PathBuf,

    /// Target number of field samples for the constituency
    #[arg(short, long)]
    samples_per_ac: i64,

    /// RON file overriding the default sampling settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    ac_name: String,

    #[arg(long)]
    ac_code: String,

    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SamplingConfig::load(path)?,
        None => SamplingConfig::default(),
    };

    let booths = load_booths_csv(&args.booths)?;
    let result = process_constituency_with(booths, args.samples_per_ac, &config);

    println!(
        "{} ({}): {} booths, {} clusters, {} selected",
        args.ac_name,
        args.ac_code,
        result.total_booths,
        result.cluster_centers.len(),
        result.selected_booths.len()
    );
    if !result.is_complete {
        println!("Incomplete selection: {}", result.reason);
    }

    std::fs::create_dir_all(&args.output_dir).context("Failed to create output dir")?;

    let selection_path = args
        .output_dir
        .join(format!("{}_selection.json", args.ac_code));
    let serialized = serde_json::to_string_pretty(&result)?;
    std::fs::write(&selection_path, serialized)
        .with_context(|| format!("Failed to write {:?}", selection_path))?;
    println!("Wrote selection to {:?}", selection_path);

    let map_dir = args.output_dir.join("maps");
    let collection = render_geojson(&result, &args.ac_name, &args.ac_code);
    let map_path = save_map(collection, &map_dir, &args.ac_code, &args.ac_name)?;
    println!("Wrote map to {:?}", map_path);

    Ok(())
}
