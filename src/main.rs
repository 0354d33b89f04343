use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::{Context, Result};
use std::path::PathBuf;
use todostore::{FileStorage, Filter, KeyValueStorage, SqliteStorage, Task, TodoStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - A to-do list persisted to a local key-value store")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the store (default: the user data directory)
    #[arg(short, long, global = true)]
    store_path: Option<PathBuf>,

    /// Storage backend
    #[arg(short, long, value_enum, default_value_t = Backend::Sqlite, global = true)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Single SQLite database file
    Sqlite,
    /// One JSON file per key
    File,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add { text: String },

    /// List tasks
    List {
        /// Which tasks to show: all, completed or active
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Toggle a task between done and not done
    Toggle { position: usize },

    /// Remove a task
    Rm { position: usize },

    /// Replace the text of a task
    Edit { position: usize, text: String },

    /// Remove every completed task
    ClearCompleted,

    /// Show task counts
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let store_path = cli.store_path.unwrap_or_else(default_store_path);
    let storage = open_storage(cli.backend, &store_path)?;
    let mut store = TodoStore::open(storage).context("Failed to open todo store")?;

    match cli.command {
        Commands::Add { text } => {
            store.add_todo(text).context("Failed to add task")?;
            println!("Added task #{}", store.len());
        }
        Commands::List { filter } => {
            store.set_filter(filter);
            print_tasks(&store);
        }
        Commands::Toggle { position } => {
            let id = store.id_at(to_index(position)?)?;
            let done = store.toggle_todo(id).context("Failed to toggle task")?;
            println!("Task #{} marked {}", position, if done { "done" } else { "not done" });
        }
        Commands::Rm { position } => {
            let id = store.id_at(to_index(position)?)?;
            let task = store.remove(id).context("Failed to remove task")?;
            println!("Removed: {}", task.text);
        }
        Commands::Edit { position, text } => {
            let id = store.id_at(to_index(position)?)?;
            store.edit(id, text).context("Failed to edit task")?;
            println!("Task #{} updated", position);
        }
        Commands::ClearCompleted => {
            let removed = store.remove_completed_todos().context("Failed to clear completed tasks")?;
            println!("Removed {} completed task(s)", removed);
        }
        Commands::Stats => {
            println!(
                "{} total, {} active, {} completed",
                store.len(),
                store.unfinished_todos(),
                store.completed_todos()
            );
        }
    }

    Ok(())
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("todostore"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn open_storage(backend: Backend, path: &std::path::Path) -> Result<Box<dyn KeyValueStorage>> {
    let storage: Box<dyn KeyValueStorage> = match backend {
        Backend::Sqlite => Box::new(
            SqliteStorage::open(path.join("todostore.db")).context("Failed to open SQLite storage")?,
        ),
        Backend::File => Box::new(FileStorage::open(path).context("Failed to open file storage")?),
    };
    Ok(storage)
}

/// Positions on the command line are 1-based
fn to_index(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| eyre::eyre!("Positions start at 1"))
}

fn print_tasks<S: KeyValueStorage>(store: &TodoStore<S>) {
    let rows = visible_rows(store);
    if rows.is_empty() {
        println!("No {} tasks", store.filter());
        return;
    }

    for (position, task) in rows {
        println!("{:>3}. {}", position, format_task(task));
    }

    println!(
        "\n{} left, {} completed",
        store.unfinished_todos(),
        store.completed_todos()
    );
}

/// Tasks passing the current filter, with their 1-based position in the full list
fn visible_rows<S: KeyValueStorage>(store: &TodoStore<S>) -> Vec<(usize, &Task)> {
    let filter = store.filter();
    store
        .todos()
        .iter()
        .enumerate()
        .filter(|(_, task)| filter.matches(task))
        .map(|(index, task)| (index + 1, task))
        .collect()
}

fn format_task(task: &Task) -> String {
    let created = chrono::DateTime::from_timestamp_millis(task.created_at)
        .filter(|_| task.created_at > 0)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let line = if task.done {
        format!("{} {}", "[x]".green(), task.text.strikethrough().dimmed())
    } else {
        format!("[ ] {}", task.text)
    };

    if created.is_empty() {
        line
    } else {
        format!("{}  {}", line, created.dimmed())
    }
}
