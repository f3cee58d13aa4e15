use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use snap_core::core_api::{
    DEFAULT_REPORT_SLUG, Engine, RecordFamily, ReportCatalog, ReportDef, Session,
};
use snap_render::{
    DEFAULT_PREVIEW_ROWS, JsonStyle, TextRenderOptions, render_json, render_text_table, write_csv,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "COLLECTION.json", required_unless_present = "list_reports")]
    collection: Option<PathBuf>,
    #[arg(value_name = "MASTERY.json", required_unless_present = "list_reports")]
    mastery: Option<PathBuf>,
    #[arg(long, short, value_name = "SLUG|TITLE", default_value = DEFAULT_REPORT_SLUG)]
    report: String,
    #[arg(long = "list-reports")]
    list_reports: bool,
    #[arg(long, conflicts_with = "csv")]
    json: bool,
    #[arg(long)]
    csv: bool,
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PREVIEW_ROWS)]
    limit: usize,
    #[arg(long, short, value_name = "PATH", conflicts_with_all = ["json", "csv"])]
    output: Option<PathBuf>,
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list_reports {
        print_report_list();
        return;
    }

    let def = ReportCatalog::find(&cli.report).unwrap_or_else(|e| {
        eprintln!("Error: {}", e.message);
        eprintln!("  run with --list-reports to see the available reports");
        process::exit(2);
    });

    let (Some(collection_path), Some(mastery_path)) = (&cli.collection, &cli.mastery) else {
        eprintln!("Error: both COLLECTION.json and MASTERY.json are required");
        process::exit(2);
    };

    let session = open_session(collection_path, mastery_path);
    let table = session.report(def);
    info!(report = def.slug, rows = table.len(), "report ready");

    if let Some(out_path) = &cli.output {
        let target = export_target(out_path, def);
        let file = fs::File::create(&target).unwrap_or_else(|e| {
            eprintln!("Error creating {}: {e}", target.display());
            process::exit(1);
        });
        write_csv(&table, io::BufWriter::new(file)).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", target.display());
            process::exit(1);
        });
        println!("Exported {} rows to {}", table.len(), target.display());
        return;
    }

    if cli.json {
        let rendered = serde_json::to_string_pretty(&render_json(&table, JsonStyle::RowsV1))
            .unwrap_or_else(|e| {
                eprintln!("Error rendering JSON output: {e}");
                process::exit(1);
            });
        println!("{rendered}");
        return;
    }

    if cli.csv {
        let stdout = io::stdout();
        write_csv(&table, stdout.lock()).unwrap_or_else(|e| {
            eprintln!("Error writing CSV output: {e}");
            process::exit(1);
        });
        return;
    }

    println!("{}", def.title);
    println!();
    print!(
        "{}",
        render_text_table(
            &table,
            TextRenderOptions {
                limit: Some(cli.limit),
                ..TextRenderOptions::default()
            },
        )
    );
    let _ = io::stdout().flush();
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_session(collection_path: &Path, mastery_path: &Path) -> Session {
    let collection = read_input(collection_path);
    let mastery = read_input(mastery_path);

    let session = Engine::new()
        .open_bytes(collection, mastery)
        .unwrap_or_else(|e| {
            eprintln!(
                "Error loading {} / {}",
                collection_path.display(),
                mastery_path.display()
            );
            eprintln!("  {}", e);
            process::exit(1);
        });
    debug!(snapshot = ?session.snapshot(), "loaded save documents");
    session
}

fn read_input(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    })
}

/// A directory gets the report's default export file name.
fn export_target(path: &Path, def: &ReportDef) -> PathBuf {
    if path.is_dir() {
        path.join(def.export_file_name)
    } else {
        path.to_path_buf()
    }
}

fn print_report_list() {
    for def in ReportCatalog::all() {
        let family = match def.family {
            RecordFamily::Cards => "cards",
            RecordFamily::Variants => "variants",
            RecordFamily::Albums => "albums",
        };
        println!(
            "{:<42}{:<10}{}  [{}]",
            def.slug, family, def.title, def.export_file_name
        );
    }
}
