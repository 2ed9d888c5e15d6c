use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use udyoga_id::{
    index::{birthday_bound, IdentityIndex, LEGACY_HALF_BITS, LEGACY_PAIR_BITS},
    install,
    interface::cli::{
        repl, CheckRow, CollisionRow, ConflictRow, DerivedRow, PatchRow, SkippedRow,
    },
    CharEncoding, Config, Directory, ExternalId, Scheme,
};

/// Deterministic identity-provider to database key mapping for UdyogaSetu
#[derive(Parser)]
#[command(name = "udyoga-id", version, about)]
struct Cli {
    /// Data directory (overrides UDYOGA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Derive identifiers, one per input
    Derive {
        inputs: Vec<String>,
        #[arg(long)]
        scheme: Option<Scheme>,
        #[arg(long)]
        encoding: Option<CharEncoding>,
        /// Print a table instead of bare identifiers
        #[arg(long)]
        table: bool,
    },
    /// Report whether identifiers have the legacy layout
    Check { ids: Vec<String> },
    /// List derived identifiers claimed by more than one external identity
    Collisions {
        /// Newline-separated external ids; defaults to the profile store
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        scheme: Option<Scheme>,
        /// Also write the index to the data directory
        #[arg(long)]
        persist: bool,
    },
    /// Plan (and optionally apply) identifier patches for the profile store
    Reconcile {
        #[arg(long)]
        scheme: Option<Scheme>,
        #[arg(long)]
        apply: bool,
    },
    /// Create the data directory and empty store files
    Install,
    /// Interactive prompt
    Repl,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.cmd {
        Cmd::Derive {
            inputs,
            scheme,
            encoding,
            table,
        } => {
            let mut mapper = config.mapper();
            mapper.scheme = scheme.unwrap_or(mapper.scheme);
            mapper.encoding = encoding.unwrap_or(mapper.encoding);

            let rows: Vec<DerivedRow> = inputs
                .into_iter()
                .map(|input| DerivedRow {
                    derived: mapper.derive(&input),
                    scheme: mapper.scheme,
                    input,
                })
                .collect();

            if table {
                print_table(rows);
            } else {
                rows.iter().for_each(|row| println!("{}", row.derived));
            }
        }

        Cmd::Check { ids } => {
            let rows: Vec<CheckRow> = ids.iter().map(|id| CheckRow::new(id)).collect();
            print_table(rows);
        }

        Cmd::Collisions {
            file,
            scheme,
            persist,
        } => {
            let scheme = scheme.unwrap_or(config.scheme);
            let index = match file {
                Some(path) => {
                    let mut index = IdentityIndex::new(config.mapper().with_scheme(scheme));
                    index.extend(
                        std::fs::read_to_string(path)?
                            .lines()
                            .filter(|line| !line.is_empty())
                            .map(ExternalId::from),
                    );
                    index
                }
                None => Directory::load_from_disk(config.clone())?.index(scheme),
            };

            let collisions = index.collisions();
            if collisions.is_empty() {
                println!("{}", "no collisions".green());
            } else {
                let rows: Vec<CollisionRow> = collisions.iter().map(CollisionRow::from).collect();
                print_table(rows);
            }

            let n = index.population() as u64;
            println!(
                "{} identities, {} distinct ids ({}); birthday bound: {:.3e} per 32-bit half, {:.3e} per legacy id",
                n,
                index.len(),
                index.mapper().scheme,
                birthday_bound(n, LEGACY_HALF_BITS),
                birthday_bound(n, LEGACY_PAIR_BITS),
            );

            if persist {
                index.persist(&config.index_path())?;
                log::info!("index written to {}", config.index_path().display());
            }
        }

        Cmd::Reconcile { scheme, apply } => {
            let scheme = scheme.unwrap_or(config.scheme);
            let mut directory = Directory::load_from_disk(config)?;
            let plan = directory.plan(scheme);

            if !plan.patches.is_empty() {
                let rows: Vec<PatchRow> = plan.patches.iter().map(PatchRow::from).collect();
                print_table(rows);
            }
            if !plan.skipped.is_empty() {
                let rows: Vec<SkippedRow> = plan.skipped.iter().map(SkippedRow::from).collect();
                println!("{}", "skipped".yellow().bold());
                print_table(rows);
            }
            if !plan.conflicts.is_empty() {
                let rows: Vec<ConflictRow> = plan.conflicts.iter().map(ConflictRow::from).collect();
                println!("{}", "conflicts".red().bold());
                print_table(rows);
            }
            println!(
                "{} consistent, {} to patch, {} skipped, {} conflicts",
                plan.consistent,
                plan.patches.len(),
                plan.skipped.len(),
                plan.conflicts.len()
            );

            if apply {
                let applied = directory.apply(&plan)?;
                println!("{}", format!("applied {} patches", applied.len()).green());
            } else if !plan.is_noop() {
                println!("dry run; pass --apply to write");
            }
        }

        Cmd::Install => {
            install::install(&config)?;
            println!("data directory ready at {}", config.data_dir.display());
        }

        Cmd::Repl => repl::run(config.mapper())?,
    }

    Ok(())
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}
