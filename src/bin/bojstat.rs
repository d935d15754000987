use anyhow::Result;
use bojstat_rs::{Client, Lang, MetadataRow, ObservationRow, reference, stats, storage};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "bojstat",
    version,
    about = "Fetch, export & summarize Bank of Japan time-series statistics"
)]
struct Cli {
    /// Output language: jp or en.
    #[arg(long, global = true, default_value = "jp")]
    lang: String,
    /// Request timeout in seconds (per physical call).
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,
    /// Minimum seconds between consecutive requests.
    #[arg(long, global = true, default_value_t = 1.0)]
    interval: f64,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch observations by series code (and optionally save or summarize).
    Get(GetArgs),
    /// Fetch observations by hierarchical position.
    Layer(LayerArgs),
    /// Fetch the full series metadata of a database.
    Metadata(MetadataArgs),
    /// Search a database's series by name keyword.
    Search(SearchArgs),
    /// List the known database codes. No network call.
    Databases,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct GetArgs {
    /// Database code (e.g. FM08)
    #[arg(short, long)]
    db: String,
    /// Series codes separated by comma or semicolon (without the DB prefix)
    #[arg(short, long)]
    codes: String,
    /// Start period (YYYYMM, YYYYQQ, YYYYHH, or YYYY depending on frequency)
    #[arg(short, long)]
    start: Option<String>,
    /// End period, same format as --start
    #[arg(short, long)]
    end: Option<String>,
    /// Paginate automatically; also lifts the 250-code limit.
    #[arg(long, default_value_t = false)]
    all: bool,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print per-series statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
struct LayerArgs {
    /// Database code (e.g. BP01)
    #[arg(short, long)]
    db: String,
    /// Frequency code: CY, FY, CH, FH, Q, M, W, W1-W7, or D
    #[arg(short, long)]
    frequency: String,
    /// Hierarchy path, 1-5 comma-separated components or * (e.g. "1,*,1")
    #[arg(short, long)]
    layer: String,
    /// Start period
    #[arg(short, long)]
    start: Option<String>,
    /// End period
    #[arg(short, long)]
    end: Option<String>,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print per-series statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
struct MetadataArgs {
    /// Database code
    #[arg(short, long)]
    db: String,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Database code
    #[arg(short, long)]
    db: String,
    /// Keyword matched case-insensitively against series names.
    keyword: Option<String>,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn out_format(format: &Option<OutFormat>, path: &Path) -> String {
    match format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let client = Client::new(Lang::from_str(&cli.lang)?)
        .timeout(Duration::from_secs(cli.timeout))
        .request_interval(Duration::from_secs_f64(cli.interval));
    match cli.cmd {
        Command::Get(args) => cmd_get(&client, args),
        Command::Layer(args) => cmd_layer(&client, args),
        Command::Metadata(args) => cmd_metadata(&client, args),
        Command::Search(args) => cmd_search(&client, args),
        Command::Databases => cmd_databases(),
    }
}

fn emit_observations(
    rows: &[ObservationRow],
    out: Option<&PathBuf>,
    format: &Option<OutFormat>,
    print_stats: bool,
) -> Result<()> {
    if let Some(path) = out {
        match out_format(format, path).as_str() {
            "csv" => storage::save_csv(rows, path)?,
            "json" => storage::save_json(rows, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    } else {
        for r in rows {
            println!("{}\t{}\t{}", r.series_code, r.date, fmt_opt(r.value));
        }
    }

    if print_stats {
        for s in stats::grouped_summary(rows) {
            println!(
                "{}  count={} missing={}  min={} max={} mean={} median={}",
                s.series_code,
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median)
            );
        }
    }
    Ok(())
}

fn emit_metadata(
    rows: &[MetadataRow],
    out: Option<&PathBuf>,
    format: &Option<OutFormat>,
) -> Result<()> {
    if let Some(path) = out {
        match out_format(format, path).as_str() {
            "csv" => storage::save_metadata_csv(rows, path)?,
            "json" => storage::save_metadata_json(rows, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    } else {
        for r in rows {
            println!("{}\t{}", r.series_code, r.name.as_deref().unwrap_or(""));
        }
    }
    Ok(())
}

fn cmd_get(client: &Client, args: GetArgs) -> Result<()> {
    let codes = parse_list(&args.codes);
    let rows = if args.all {
        client.get_data_all(&args.db, &codes, args.start.as_deref(), args.end.as_deref())?
    } else {
        client.get_data(
            &args.db,
            &codes,
            args.start.as_deref(),
            args.end.as_deref(),
            None,
        )?
    };
    emit_observations(&rows, args.out.as_ref(), &args.format, args.stats)
}

fn cmd_layer(client: &Client, args: LayerArgs) -> Result<()> {
    let rows = client.get_layer(
        &args.db,
        &args.frequency,
        &args.layer,
        args.start.as_deref(),
        args.end.as_deref(),
        None,
    )?;
    emit_observations(&rows, args.out.as_ref(), &args.format, args.stats)
}

fn cmd_metadata(client: &Client, args: MetadataArgs) -> Result<()> {
    let rows = client.get_metadata(&args.db)?;
    emit_metadata(&rows, args.out.as_ref(), &args.format)
}

fn cmd_search(client: &Client, args: SearchArgs) -> Result<()> {
    let rows = client.search_series(&args.db, args.keyword.as_deref())?;
    emit_metadata(&rows, None, &None)
}

fn cmd_databases() -> Result<()> {
    for (code, description) in reference::databases() {
        println!("{}\t{}", code, description);
    }
    Ok(())
}
