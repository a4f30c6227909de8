use bookhaven_common::{FetchState, SortDirection, ThemeMode};
use bookhaven_core::stores::ThemePreference;
use bookhaven_core::{CatalogService, Config, FileStore, KeyValueStore, OpenLibraryClient};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod render;

/// bookhaven - browse an Open Library reading list and keep a collection.
#[derive(Parser)]
#[command(name = "bookhaven", version)]
struct Args {
    /// Directory holding the saved collection and preferences.
    #[arg(long, global = true, env = "BOOKHAVEN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and print the reading list, sorted by year.
    List {
        #[arg(long, value_enum, default_value_t = SortArg::Desc)]
        sort: SortArg,
    },
    /// Fetch and print work details. Several ids are fetched concurrently.
    Show {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Save a book, or un-save it if already saved. Books not on the
    /// reading list are saved from their work record.
    Toggle { id: String },
    /// Remove a book from the collection.
    Remove { id: String },
    /// Print the saved books.
    Collection,
    /// Remove every saved book.
    Clear,
    /// Print the stored theme, or set or toggle it.
    Theme { mode: Option<ThemeArg> },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortDirection {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortDirection::Ascending,
            SortArg::Desc => SortDirection::Descending,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
    Toggle,
}

fn configure_logging(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_target(false)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn open_storage(config: &Config) -> Arc<dyn KeyValueStore> {
    let dir = config.ensure_data_dir().unwrap_or_else(|e| {
        error!("Data directory unavailable: {e}");
        std::process::exit(1);
    });
    info!("Using data directory {}", dir.display());
    match FileStore::open(&dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to open storage at {}: {e}", dir.display());
            std::process::exit(1);
        }
    }
}

/// Exit non-zero when the command's own fetch failed.
fn exit_on_failure(state: &FetchState) {
    if let FetchState::Failed(message) = state {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    configure_logging(args.verbose);

    let mut config = Config::load();
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    let storage = open_storage(&config);

    let service = CatalogService::new(
        Arc::new(OpenLibraryClient::new(&config)),
        storage.clone(),
    );

    match args.command {
        Command::List { sort } => {
            let state = service.refresh_list().await;
            exit_on_failure(&state);
            let items = service.sorted_list(sort.into());
            render::print_items(&items, |id| service.is_saved(id));
        }
        Command::Show { ids } => {
            let states = service.load_details(&ids).await;
            let mut failed = false;
            for (id, state) in ids.iter().zip(&states) {
                match (state, service.detail(id)) {
                    (FetchState::Failed(message), _) => {
                        eprintln!("{id}: {message}");
                        failed = true;
                    }
                    (_, Some(detail)) => render::print_detail(&detail, service.is_saved(id)),
                    (_, None) => eprintln!("{id}: no detail available"),
                }
            }
            if failed {
                std::process::exit(1);
            }
        }
        Command::Toggle { id } => {
            if service.toggle_saved_by_id(&id).await.is_none() {
                let reason = service
                    .detail_state(&id)
                    .error()
                    .map(str::to_string)
                    .unwrap_or_else(|| "book not found".to_string());
                eprintln!("error: {id}: {reason}");
                std::process::exit(1);
            }
            render::print_notification(&service.notification());
        }
        Command::Remove { id } => {
            if service.remove_saved(&id).is_none() {
                eprintln!("{id} is not in the collection");
                std::process::exit(1);
            }
            render::print_notification(&service.notification());
        }
        Command::Collection => {
            let saved = service.saved_items();
            if saved.is_empty() {
                println!("Your collection is empty.");
            } else {
                render::print_items(&saved, |_| true);
            }
        }
        Command::Clear => {
            service.clear_collection();
            render::print_notification(&service.notification());
        }
        Command::Theme { mode } => {
            let mut theme = ThemePreference::load(storage);
            match mode {
                Some(ThemeArg::Light) => theme.set(ThemeMode::Light),
                Some(ThemeArg::Dark) => theme.set(ThemeMode::Dark),
                Some(ThemeArg::Toggle) => {
                    theme.toggle();
                }
                None => {}
            }
            println!("{}", theme.mode());
        }
    }
}
