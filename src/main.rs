use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use vertica_native::engine::load::{
    BulkLoader, FieldSelection, JsonLinesSource, LoaderSettings, RejectionLog, TargetTable,
};
use vertica_native::engine::native::NativeReader;
use vertica_native::engine::sink::NativeFileSink;
use vertica_native::logging;
use vertica_native::shared::config::CONFIG;
use vertica_native::shared::datetime::time::TimeConfig;

#[derive(Parser)]
#[command(name = "vertica_native")]
#[command(about = "Encode rows into Vertica NATIVE bulk load streams", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode JSON-lines rows for the configured target table into a NATIVE file
    Load {
        /// One JSON object per line
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the header and row count of a NATIVE file
    Inspect { file: PathBuf },
}

fn cmd_load(input: &Path, output: &Path) -> anyhow::Result<()> {
    let table = TargetTable::from_config(&CONFIG.target);
    let selection = FieldSelection::from_config(&CONFIG.target);
    let meta = table.input_meta(&selection)?;
    let zone = TimeConfig::from_app_config().zone();

    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let mut source = JsonLinesSource::new(meta, BufReader::new(file), zone);

    let rejections = RejectionLog::open(
        CONFIG.load.exceptions_file.as_deref().map(Path::new),
        CONFIG.load.rejected_file.as_deref().map(Path::new),
    )
    .context("opening rejection logs")?;

    let mut loader = BulkLoader::new(
        table,
        selection,
        Box::new(NativeFileSink::new(output)),
        Box::new(rejections),
        LoaderSettings::from_app_config(),
    );

    match loader.run(&mut source) {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e) => {
            e.log_error();
            Err(e.into())
        }
    }
}

fn cmd_inspect(path: &Path) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = NativeReader::new(BufReader::new(file))?;

    let header = reader.header().clone();
    println!("File:    {}", path.display());
    println!("Columns: {}", header.column_count());
    for (i, width) in header.column_widths().iter().enumerate() {
        let width = if *width < 0 { "variable".to_string() } else { format!("{width} bytes") };
        println!("  [{i}] {width}");
    }

    let mut nulls = 0u64;
    while let Some(row) = reader.next_row()? {
        nulls += (0..header.column_count()).filter(|c| row.is_null(*c)).count() as u64;
    }
    println!("Rows:    {}", reader.rows_read());
    println!("Nulls:   {nulls}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init()?;

    match args.command {
        Command::Load { input, output } => {
            info!(target: "vertica_native::load", input = %input.display(), output = %output.display(), "Starting load");
            cmd_load(&input, &output)
        }
        Command::Inspect { file } => cmd_inspect(&file),
    }
}
