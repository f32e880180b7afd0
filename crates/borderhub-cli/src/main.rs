//! hub CLI: terminal access to the borderland results and the dashboard.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use borderhub_core::{
    Aggregation, BorderSelection, DatasetKind, Datasets, Decay, HubConfig, ResultExplorer, View,
};
use borderhub_server::{serve, ServerConfig};

#[derive(Parser)]
#[command(
    name = "hub",
    about = "🗺️  borderhub: Kenya–Uganda borderland results explorer",
    version,
    author
)]
struct Cli {
    /// Config file (default: ./borderhub.yaml if present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the result CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web dashboard server
    Serve {
        /// Path to the results directory
        dir: Option<PathBuf>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,
        /// Directory holding the slide images
        #[arg(long)]
        pictures: Option<PathBuf>,
    },
    /// Summarise the result files in a directory
    Inspect {
        /// Path to the results directory
        dir: Option<PathBuf>,
    },
    /// MPI per border and decay, in long form
    Bars {
        /// Comma-separated borders (default: all)
        #[arg(long, short)]
        borders: Option<String>,
    },
    /// MPI column for one decay, or the border × year CI matrix
    Heatmap {
        /// Decay parameter (0.02, 0.03 or 0.05)
        #[arg(long, short, default_value = "0.02", conflicts_with = "ci")]
        decay: String,
        /// Show the CI matrix instead
        #[arg(long)]
        ci: bool,
        /// How duplicate CI cells are combined
        #[arg(long, default_value = "sum", value_parser = ["sum", "mean", "count"])]
        agg: String,
    },
    /// CI over time per border
    Trends {
        /// Comma-separated borders (default: all)
        #[arg(long, short)]
        borders: Option<String>,
        /// Show a single year across all borders instead
        #[arg(long, short, conflicts_with = "borders")]
        year: Option<i32>,
    },
    /// Write a loaded result file as CSV
    Export {
        /// Dataset name (e.g. ci_results or mpi_border_results.csv)
        dataset: String,
        /// Comma-separated borders (default: all)
        #[arg(long, short)]
        borders: Option<String>,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List the GIS walkthrough slides
    Slides,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so exported CSV on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut config = HubConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Serve { dir, host, port, pictures } => {
            if let Some(dir) = dir {
                config.data_dir = dir;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(pictures) = pictures {
                config.pictures_dir = pictures;
            }
            cmd_serve(config).await?;
        }
        Commands::Inspect { dir } => {
            cmd_inspect(dir.as_deref().unwrap_or(&config.data_dir))?;
        }
        Commands::Bars { borders } => {
            cmd_bars(&config.data_dir, borders.as_deref())?;
        }
        Commands::Heatmap { decay, ci, agg } => {
            cmd_heatmap(&config.data_dir, &decay, ci, &agg)?;
        }
        Commands::Trends { borders, year } => {
            cmd_trends(&config.data_dir, borders.as_deref(), year)?;
        }
        Commands::Export { dataset, borders, output } => {
            cmd_export(&config.data_dir, &dataset, borders.as_deref(), output)?;
        }
        Commands::Slides => {
            cmd_slides(&config);
        }
    }

    Ok(())
}

// ─── Command implementations ──────────────────────────────────────────────────

async fn cmd_serve(config: HubConfig) -> Result<()> {
    println!("🗺️  Borderland Dashboard");
    println!("   Results:  {}", config.data_dir.display());
    println!("   Pictures: {}", config.pictures_dir.display());
    println!("   URL:      http://{}:{}", config.host, config.port);
    println!();

    serve(ServerConfig::from(config)).await?;
    Ok(())
}

fn cmd_inspect(dir: &Path) -> Result<()> {
    if !dir.exists() {
        anyhow::bail!("Results directory not found: {}", dir.display());
    }

    let data = Datasets::load(dir)?;
    println!("Results in: {}", dir.display());
    println!("Loaded: {}", data.loaded_at.format("%Y-%m-%d %H:%M:%S"));
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Dataset", "File", "Rows", "Columns", "Status"]);
    for kind in DatasetKind::ALL {
        match data.table(kind) {
            Ok(t) => table.add_row([
                kind.label(),
                kind.file_name(),
                &t.len().to_string(),
                &t.headers.len().to_string(),
                "loaded",
            ]),
            Err(_) => table.add_row([kind.label(), kind.file_name(), "-", "-", "missing"]),
        };
    }
    println!("{}", table);

    let explorer = ResultExplorer::new(Arc::new(data));
    let years = explorer.year_options();
    println!("Borders: {}", explorer.border_options().join(", "));
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        println!("Years:   {}–{}", first, last);
    }
    Ok(())
}

fn cmd_bars(dir: &Path, borders: Option<&str>) -> Result<()> {
    let explorer = load(dir)?;
    let Some(rows) = ready(explorer.mpi_long(&BorderSelection::from_query(borders))) else {
        return Ok(());
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Border", "Decay", "MPI"]);
    for row in &rows {
        table.add_row([row.border.as_str(), row.decay.as_str(), &format_value(row.value)]);
    }
    println!("{}", table);
    Ok(())
}

fn cmd_heatmap(dir: &Path, decay: &str, ci: bool, agg: &str) -> Result<()> {
    let explorer = load(dir)?;

    if ci {
        let agg: Aggregation = agg.parse()?;
        let matrix = explorer.ci_matrix(agg)?;
        if matrix.is_empty() {
            println!("{}", borderhub_core::explorer::NO_CI_DATA);
            return Ok(());
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        let mut header = vec!["Border".to_string()];
        header.extend(matrix.columns.iter().cloned());
        table.set_header(header);
        for (row, cells) in matrix.rows.iter().zip(&matrix.cells) {
            let mut line = vec![row.clone()];
            line.extend(cells.iter().map(|c| format_value(*c)));
            table.add_row(line);
        }
        println!("CI ({})", matrix.aggregation);
        println!("{}", table);
        return Ok(());
    }

    let decay: Decay = decay.parse()?;
    let borders = &explorer.datasets().borders;
    if borders.is_empty() {
        println!("{}", borderhub_core::explorer::NO_MPI_DATA);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Border", &format!("MPI ({})", decay)]);
    for post in borders {
        table.add_row([post.name.as_str(), &format_value(post.mpi(decay))]);
    }
    println!("{}", table);
    Ok(())
}

fn cmd_trends(dir: &Path, borders: Option<&str>, year: Option<i32>) -> Result<()> {
    let explorer = load(dir)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    if let Some(year) = year {
        let Some(values) = ready(explorer.year_snapshot(year)) else {
            return Ok(());
        };
        table.set_header(["Border", &format!("CI {}", year)]);
        for v in &values {
            table.add_row([v.border.as_str(), &format_value(Some(v.ci))]);
        }
    } else {
        let Some(series) = ready(explorer.ci_series(&BorderSelection::from_query(borders)))
        else {
            return Ok(());
        };
        table.set_header(["Border", "Year", "CI"]);
        for s in &series {
            for p in &s.points {
                table.add_row([s.border.as_str(), &p.year.to_string(), &format_value(Some(p.ci))]);
            }
        }
    }
    println!("{}", table);
    Ok(())
}

fn cmd_export(
    dir: &Path,
    dataset: &str,
    borders: Option<&str>,
    output: Option<PathBuf>,
) -> Result<()> {
    let kind: DatasetKind = dataset.parse()?;
    let explorer = load(dir)?;
    let bytes = explorer.export_selection(kind, &BorderSelection::from_query(borders))?;

    match output {
        Some(path) => {
            std::fs::write(&path, &bytes)?;
            println!("Exported {} to {}", kind.file_name(), path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
        }
    }

    Ok(())
}

fn cmd_slides(config: &HubConfig) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["#", "Title", "Image", "Caption"]);
    for (i, slide) in config.slides.iter().enumerate() {
        table.add_row([
            &(i + 1).to_string(),
            slide.title.as_str(),
            slide.image.as_str(),
            slide.caption.as_str(),
        ]);
    }
    println!("{}", table);
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn load(dir: &Path) -> Result<ResultExplorer> {
    debug!(dir = %dir.display(), "loading result files");
    Ok(ResultExplorer::new(Arc::new(Datasets::load(dir)?)))
}

/// Print the message of a non-ready view and return its data otherwise.
fn ready<T>(view: View<T>) -> Option<T> {
    match view {
        View::Ready { data } => Some(data),
        View::Empty { message } | View::Unavailable { message } => {
            println!("{}", message);
            None
        }
    }
}

fn format_value(v: Option<f64>) -> String {
    v.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}
