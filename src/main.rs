mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use famcal_client::{ApiError, ChildFilter};
use famcal_core::grid::ViewMode;
use tracing_subscriber::EnvFilter;

use crate::commands::Context;
use crate::commands::children::ChildArgs;
use crate::commands::events::EventArgs;

#[derive(Parser)]
#[command(name = "famcal")]
#[command(about = "Plan your family's schedule: events, kids and school flyers from the terminal")]
struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to your family calendar account
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create a new account
    Register,
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Manage child profiles
    Children {
        #[command(subcommand)]
        command: ChildrenCommand,
    },
    /// Create, change and delete events
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },
    /// Show the calendar grid
    Calendar {
        /// month, week or day (defaults to default_view from config)
        #[arg(long)]
        view: Option<ViewMode>,

        /// Date inside the period to show (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Whose events: all, mine or a child id
        #[arg(long, default_value = "all")]
        child: ChildFilter,

        /// Move this many periods forward (negative for back)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        shift: i32,
    },
    /// Turn an email or a photo of a flyer into events
    Analyze {
        #[command(subcommand)]
        source: AnalyzeSource,

        /// Attach proposed events to this child
        #[arg(long, global = true)]
        child: Option<i64>,

        /// Create the proposed events after confirming
        #[arg(long, global = true)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum ChildrenCommand {
    List,
    Add(ChildArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        args: ChildArgs,
    },
    Remove {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List events, grouped by day
    List {
        /// First day (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Last day (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        #[arg(long, default_value = "all")]
        child: ChildFilter,
    },
    Add(EventArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        args: EventArgs,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AnalyzeSource {
    /// Read an email from a file, or "-" for stdin
    Email { path: String },
    /// Upload a photo (JPEG, PNG, WebP or HEIC)
    Photo { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context::load()?;
    let result = run(cli.command, &ctx).await;
    forget_rejected_session(&ctx, result)
}

/// Drop the stored session when the server refused it, keeping the
/// command's own error either way.
fn forget_rejected_session(ctx: &Context, result: Result<()>) -> Result<()> {
    if result.as_ref().err().is_some_and(session_rejected) {
        if let Err(e) = ctx.clear_session() {
            tracing::warn!("could not remove rejected session: {e:#}");
        }
    }
    result
}

async fn run(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Login { email } => commands::auth::login(ctx, email).await,
        Commands::Register => commands::auth::register(ctx).await,
        Commands::Logout => commands::auth::logout(ctx),
        Commands::Whoami => commands::auth::whoami(ctx).await,
        Commands::Children { command } => match command {
            ChildrenCommand::List => commands::children::list(ctx).await,
            ChildrenCommand::Add(args) => commands::children::add(ctx, args).await,
            ChildrenCommand::Edit { id, args } => commands::children::edit(ctx, id, args).await,
            ChildrenCommand::Remove { id, force } => commands::children::remove(ctx, id, force).await,
        },
        Commands::Events { command } => match command {
            EventsCommand::List { from, to, child } => {
                commands::events::list(ctx, from.as_deref(), to.as_deref(), child).await
            }
            EventsCommand::Add(args) => commands::events::add(ctx, args).await,
            EventsCommand::Edit { id, args } => commands::events::edit(ctx, id, args).await,
            EventsCommand::Delete { id, force } => commands::events::delete(ctx, id, force).await,
        },
        Commands::Calendar {
            view,
            date,
            child,
            shift,
        } => {
            let view = view.unwrap_or(ctx.config.default_view);
            commands::calendar::run(ctx, view, date.as_deref(), child, shift).await
        }
        Commands::Analyze { source, child, save } => match source {
            AnalyzeSource::Email { path } => commands::analyze::email(ctx, &path, child, save).await,
            AnalyzeSource::Photo { path } => commands::analyze::photo(ctx, &path, child, save).await,
        },
    }
}

/// Logs go to stderr so rendered calendars on stdout stay clean.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "famcal=debug,famcal_client=debug,famcal_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Whether the server rejected our token somewhere in this error chain.
fn session_rejected(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<ApiError>().is_some_and(ApiError::is_unauthorized))
}
