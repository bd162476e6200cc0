use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use barplots::config::BarplotConfig;
use barplots::csv_reader;
use barplots::data::PlotData;
use barplots::parser::parse_assignment;
use barplots::style::StyleMap;
use barplots::{render_barplot, Orientation, OutputFormat, RenderOptions, Rotation};

#[derive(Parser, Debug)]
#[command(name = "barplots")]
#[command(about = "Render multi-index bar charts from CSV data", long_about = None)]
struct Args {
    /// Index columns, outermost first
    #[arg(long = "index", required = true, num_args = 1..)]
    index: Vec<String>,

    /// Value column (defaults to the first non-index column)
    #[arg(long)]
    value: Option<String>,

    /// Standard deviation column drawn as error whiskers
    #[arg(long)]
    std: Option<String>,

    /// Input CSV or JSON file (reads CSV from stdin when omitted)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Output file (writes to stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Draw horizontal bars
    #[arg(long)]
    horizontal: bool,

    #[arg(long)]
    bar_width: Option<f64>,

    #[arg(long)]
    space_width: Option<f64>,

    /// "auto" or degrees
    #[arg(long)]
    minor_rotation: Option<Rotation>,

    /// "auto" or degrees
    #[arg(long)]
    major_rotation: Option<Rotation>,

    /// Bar color for a category path, e.g. 'cnn=red' or 'run1/mlp=#00ff00'
    #[arg(long = "color")]
    colors: Vec<String>,

    /// Bar opacity for a category path, e.g. 'cnn=0.5'
    #[arg(long = "alpha")]
    alphas: Vec<String>,

    /// Hatch pattern for a category path, e.g. 'mlp=//'
    #[arg(long = "hatch")]
    hatches: Vec<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long, default_value = "png", value_parser = ["png", "svg"])]
    format: String,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn read_input(path: Option<&Path>) -> Result<PlotData> {
    match path {
        None => csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin"),
        Some(p) if p.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) => {
            let file = File::open(p).with_context(|| format!("Failed to open {}", p.display()))?;
            let value: serde_json::Value = serde_json::from_reader(file)
                .with_context(|| format!("Failed to parse JSON from {}", p.display()))?;
            PlotData::from_json(&value)
        }
        Some(p) => {
            let file = File::open(p).with_context(|| format!("Failed to open {}", p.display()))?;
            csv_reader::read_csv(file).with_context(|| format!("Failed to read CSV from {}", p.display()))
        }
    }
}

fn merge_assignments<V>(
    map: &mut StyleMap<V>,
    raw: &[String],
    parse: impl Fn(&str) -> Result<V>,
) -> Result<()> {
    for item in raw {
        let (path, value) = parse_assignment(item)?;
        map.insert(path, parse(&value)?);
    }
    Ok(())
}

fn apply_overrides(config: &mut BarplotConfig, args: &Args) -> Result<()> {
    if args.horizontal {
        config.orientation = Orientation::Horizontal;
    }
    if let Some(w) = args.bar_width {
        config.bar_width = w;
    }
    if let Some(w) = args.space_width {
        config.space_width = w;
    }
    if let Some(r) = args.minor_rotation {
        config.minor_rotation = r;
    }
    if let Some(r) = args.major_rotation {
        config.major_rotation = r;
    }
    if let Some(t) = &args.title {
        config.title = Some(t.clone());
    }
    if config.bar_width <= 0.0 || config.space_width < 0.0 {
        bail!("bar width must be positive and space width non-negative");
    }

    merge_assignments(&mut config.colors, &args.colors, |v| Ok(v.to_string()))?;
    merge_assignments(&mut config.alphas, &args.alphas, |v| {
        v.parse::<f64>()
            .with_context(|| format!("Invalid alpha '{}'", v))
    })?;
    if !args.hatches.is_empty() {
        let hatches = config.hatches.get_or_insert_with(StyleMap::new);
        merge_assignments(hatches, &args.hatches, |v| Ok(v.to_string()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BarplotConfig::from_json_file(path)?,
        None => BarplotConfig::default(),
    };
    apply_overrides(&mut config, &args)?;

    let data = read_input(args.input.as_deref())?;
    let table = data
        .to_table(&args.index, args.value.as_deref(), args.std.as_deref())
        .context("Failed to build table from input")?;
    tracing::info!(rows = table.len(), depth = table.depth(), "table loaded");

    let options = RenderOptions {
        width: args.width,
        height: args.height,
        format: if args.format == "svg" {
            OutputFormat::Svg
        } else {
            OutputFormat::Png
        },
    };

    let bytes = render_barplot(&table, &config, &options).context("Failed to render plot")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .context("Failed to write image to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
