use clap::Parser;
use csvarena_core::{
    Arena, CellValue, ConfigOverrides, CsvParser, ParserConfig, RaggedRowPolicy, Table,
    TracingDiagnosticHandler,
};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "csvarena.yaml";

/// csvarena - inspect delimited text tables without copying them
#[derive(Parser, Debug, Clone)]
#[command(name = "csvarena")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file (comma or semicolon separated)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to csvarena.yaml (or .json) configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fail on rows whose field count differs from the header
    #[arg(long)]
    strict: bool,

    /// Minimum arena region size in bytes
    #[arg(long, value_name = "BYTES")]
    region_capacity: Option<usize>,

    /// Print column names and inferred types
    #[arg(long)]
    schema: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Print statistics for one column
    #[arg(long, value_name = "COLUMN")]
    stats: Option<String>,

    /// Print a single row (0-based)
    #[arg(long, value_name = "N")]
    row: Option<usize>,

    /// Leave out rows that have a missing cell
    #[arg(long)]
    drop_missing: bool,

    /// Write the (possibly cleaned) table to FILE
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a default csvarena.yaml in the current directory
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for pass summaries, RUST_LOG=trace for arena growth
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.init {
        init_project()?;
        return Ok(());
    }

    let config = load_config(&cli)?;

    let Some(file) = cli.file.clone() else {
        eprintln!("Error: No input file specified. Use --help for usage information.");
        std::process::exit(1);
    };

    debug!(?config, "resolved configuration");
    run(&cli, &file, config)
}

/// Write the default configuration file
fn init_project() -> anyhow::Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        anyhow::bail!("{} already exists", DEFAULT_CONFIG_FILE);
    }
    ParserConfig::init_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", DEFAULT_CONFIG_FILE, e))?;
    println!("Created {}", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Load configuration from file (if any) and apply command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<ParserConfig> {
    let mut config = if let Some(ref path) = cli.config {
        ParserConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config file: {}", e))?
    } else {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            ParserConfig::from_file(&default_path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", DEFAULT_CONFIG_FILE, e))?
        } else {
            ParserConfig::default()
        }
    };

    let mut overrides = ConfigOverrides::default();
    if cli.strict {
        overrides.ragged_rows = Some(RaggedRowPolicy::Reject);
    }
    if let Some(capacity) = cli.region_capacity {
        if capacity == 0 {
            anyhow::bail!("--region-capacity must be greater than zero");
        }
        overrides.region_capacity = Some(capacity);
    }
    config.merge(&overrides);

    Ok(config)
}

fn run(cli: &Cli, file: &Path, config: ParserConfig) -> anyhow::Result<()> {
    let arena = Arena::with_region_capacity(config.region_capacity);
    let parser = CsvParser::new(&arena, config, Arc::new(TracingDiagnosticHandler::new()));

    let mut table = parser
        .parse_file(file)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", file.display(), e))?;
    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded {}",
        file.display()
    );

    if cli.drop_missing {
        table = table.drop_missing(&arena)?;
    }

    let mut printed = false;
    if cli.schema {
        print_schema(&table, cli.json)?;
        printed = true;
    }
    if let Some(ref column) = cli.stats {
        print_stats(&table, column, cli.json)?;
        printed = true;
    }
    if let Some(index) = cli.row {
        print_row(&table, index, cli.json)?;
        printed = true;
    }

    if let Some(ref output) = cli.output {
        table
            .save(output)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", output.display(), e))?;
        if !printed {
            println!("Wrote {} rows to {}", table.row_count(), output.display());
        }
    } else if !printed {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&table_to_json(&table))?);
        } else {
            print!("{table}");
        }
    }

    debug!(
        regions = arena.region_count(),
        bytes = arena.allocated_bytes(),
        "arena usage"
    );
    Ok(())
}

fn print_schema(table: &Table<'_>, as_json: bool) -> anyhow::Result<()> {
    let schema = table.schema();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    println!("{} rows", schema.rows);
    for column in &schema.columns {
        println!("{:>3}  {:<8} {}", column.ordinal, column.column_type, column.name);
    }
    Ok(())
}

fn print_stats(table: &Table<'_>, column: &str, as_json: bool) -> anyhow::Result<()> {
    let summary = table.summarize(column)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let show = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
    println!("column:  {} ({})", summary.name, summary.column_type);
    println!("count:   {}", summary.count);
    println!("missing: {}", summary.missing);
    println!("mean:    {}", show(summary.mean));
    println!("median:  {}", show(summary.median));
    println!("std dev: {}", show(summary.std_dev));
    println!("mode:    {}", summary.mode.as_deref().unwrap_or("-"));
    Ok(())
}

fn print_row(table: &Table<'_>, index: usize, as_json: bool) -> anyhow::Result<()> {
    let row = table.row_at(index)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&row_to_json(table, index))?);
        return Ok(());
    }

    let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
    println!("{}", cells.join(", "));
    Ok(())
}

fn cell_to_json(value: CellValue<'_>) -> Value {
    match value {
        CellValue::Integer(n) => json!(n),
        CellValue::Float(x) => serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number),
        CellValue::Boolean(b) => Value::Bool(b),
        CellValue::Text(span) => Value::String(span.to_string()),
        CellValue::Null => Value::Null,
    }
}

/// One row as an object keyed by column name; cells that fail to convert are
/// emitted as their raw text
fn row_to_json(table: &Table<'_>, index: usize) -> Value {
    let mut object = Map::new();
    for column in table.columns() {
        let value = match table.value_at(index, column.ordinal) {
            Ok(value) => cell_to_json(value),
            Err(_) => table
                .cell(index, column.ordinal)
                .map_or(Value::Null, |cell| Value::String(cell.to_string())),
        };
        object.insert(column.name.to_string(), value);
    }
    Value::Object(object)
}

fn table_to_json(table: &Table<'_>) -> Value {
    Value::Array(
        (0..table.row_count())
            .map(|index| row_to_json(table, index))
            .collect(),
    )
}
