//! edhforge - build a commander deck from an owned-card inventory.
//!
//! ## Usage
//!
//! ```text
//! edhforge --inventory cards.csv --payload reference.json --commander NAME [OPTIONS]
//!
//! Options:
//!   --partner NAME        Partner commander
//!   --theme TEXT          Theme the average deck was built for
//!   --budget TIER         regular | budget | expansive
//!   --seed N              Seed basic-land choices for a reproducible deck
//!   --json                Print the full result as JSON
//!   --progress            Report build progress on stderr
//! ```
//!
//! Logs go to stderr and follow `RUST_LOG` (default `info`).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::thread;

use anyhow::{Context, Result, bail};
use clap::Parser;
use edhforge::{
    BudgetTier, BuildProgress, BuildRequest, DeckAssembler, InventoryIndex, PayloadProvider,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "edhforge", version)]
#[command(about = "Build a commander deck from the cards you own")]
struct Args {
    /// Inventory CSV with a `Name` column.
    #[arg(long)]
    inventory: PathBuf,
    /// Reference data JSON (average deck, similar cards, top cards).
    #[arg(long)]
    payload: PathBuf,
    #[arg(long)]
    commander: String,
    #[arg(long)]
    partner: Option<String>,
    #[arg(long)]
    theme: Option<String>,
    #[arg(long)]
    budget: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    progress: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_inventory(path: &Path) -> Result<InventoryIndex> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        bail!("invalid input: inventory must be a .csv file: {}", path.display());
    }
    let file = File::open(path)
        .with_context(|| format!("failed to open inventory {}", path.display()))?;
    InventoryIndex::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to read inventory {}", path.display()))
}

fn load_payload(path: &Path) -> Result<PayloadProvider> {
    let file =
        File::open(path).with_context(|| format!("failed to open payload {}", path.display()))?;
    PayloadProvider::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to read payload {}", path.display()))
}

fn describe(event: &BuildProgress) -> String {
    match event {
        BuildProgress::ReferenceResolved {
            commander_name,
            cards,
        } => format!("average deck for {commander_name}: {cards} cards"),
        BuildProgress::InventoryFiltered { kept, unavailable } => {
            format!("{kept} owned, {unavailable} missing")
        }
        BuildProgress::Checking { index, total, card } => {
            format!("checking {index}/{total} - {card}")
        }
        BuildProgress::Substituted {
            original,
            replacement,
            kind,
        } => format!("{original} -> {replacement} ({kind:?})"),
        BuildProgress::TypeFallback {
            card_type,
            missing,
            replaced,
        } => format!("{card_type}: replaced {replaced} of {missing}"),
        BuildProgress::Finished {
            deck_size,
            unavailable,
        } => format!("done: {deck_size} cards, {unavailable} unavailable"),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let budget = BudgetTier::from_token(args.budget.as_deref()).context("invalid --budget")?;
    let mut request = BuildRequest::new(&args.commander).with_budget(budget);
    if let Some(partner) = &args.partner {
        request = request.with_partner(partner);
    }
    if let Some(theme) = &args.theme {
        request = request.with_theme(theme);
    }
    request.validate()?;

    let inventory = load_inventory(&args.inventory)?;
    let provider = load_payload(&args.payload)?;

    let mut assembler = DeckAssembler::new(provider, inventory);
    if let Some(seed) = args.seed {
        assembler = assembler.with_seed(seed);
    }

    let mut listener = None;
    if args.progress {
        let (sender, receiver) = channel();
        assembler = assembler.with_progress(sender);
        listener = Some(thread::spawn(move || {
            for event in receiver {
                eprintln!("[progress] {}", describe(&event));
            }
        }));
    }

    let result = assembler.build(&request);
    // Closes the progress channel so the listener can finish.
    drop(assembler);
    if let Some(listener) = listener {
        if listener.join().is_err() {
            warn!("progress listener panicked");
        }
    }

    let result = result
        .with_context(|| format!("failed to build a deck for {}", request.commander_name()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{result}");
    }
    Ok(())
}
