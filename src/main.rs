use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use gymdash::{
    app::App,
    app_dirs::AppDirs,
    auth::AuthState,
    catalog::{Catalog, MuscleGroup},
    config::{Config, ConfigStore, FileConfigStore},
    export::export_history_csv,
    gateway::PersistenceGateway,
    logging,
    runtime::{run_app, CrosstermEventSource, FixedTicker, Runner},
    store::SqliteGateway,
    GatewayError,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin, Write},
    path::{Path, PathBuf},
};
use tracing::info;

/// terminal dashboard for gym members: build workouts, run them against a live timer, review history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal gym portal: browse the exercise catalog, build workout templates, run a timed session with a per-exercise checklist and keep a history of finished workouts."
)]
pub struct Cli {
    /// member id to log in as (overrides the config file)
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// display name shown on the dashboard
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// path to the workout database
    #[clap(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// write the member's workout history as CSV to PATH ("-" for stdout) and exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,

    /// print the exercise catalog and exit
    #[clap(long)]
    list_exercises: bool,

    /// only list exercises for this muscle group
    #[clap(short = 'm', long, value_enum, requires = "list_exercises")]
    muscle_group: Option<MuscleGroup>,

    /// discard a running workout without asking first
    #[clap(long)]
    no_confirm: bool,

    /// store --user and --name in the config file for next time (other flags are not saved)
    #[clap(long)]
    remember: bool,

    /// forget the stored member and exit
    #[clap(long, conflicts_with_all = ["user", "remember"])]
    logout: bool,
}

impl Cli {
    /// Layer command line values over the stored config.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(user) = &self.user {
            cfg.user_id = Some(user.clone());
        }
        if let Some(name) = &self.name {
            cfg.display_name = name.clone();
        }
        if let Some(db) = &self.db {
            cfg.db_path = Some(db.clone());
        }
        if self.no_confirm {
            cfg.confirm_cancel = false;
        }
        cfg
    }
}

fn open_gateway(cfg: &Config) -> Result<SqliteGateway, GatewayError> {
    match &cfg.db_path {
        Some(path) => SqliteGateway::open(path),
        None => SqliteGateway::open_default(),
    }
}

/// Persist only the member identity; the other command line overrides apply to this run.
fn remember_identity<S: ConfigStore>(store: &S, cfg: &Config) -> io::Result<()> {
    let mut stored = store.load();
    stored.user_id = cfg.user_id.clone();
    stored.display_name = cfg.display_name.clone();
    store.save(&stored)
}

fn list_exercises<W: Write>(group: Option<MuscleGroup>, out: &mut W) -> Result<usize, Box<dyn Error>> {
    let catalog = Catalog::load()?;
    let exercises = match group {
        Some(g) => catalog.by_muscle_group(g),
        None => catalog.all().iter().collect(),
    };
    for e in &exercises {
        writeln!(
            out,
            "{:<24} {:<10} {}",
            e.name,
            e.muscle_group.to_string(),
            e.equipment
        )?;
    }
    Ok(exercises.len())
}

fn export_history<G: PersistenceGateway + ?Sized>(
    gateway: &G,
    auth: &AuthState,
    path: &Path,
) -> Result<usize, Box<dyn Error>> {
    let member = auth.require_member()?;
    let records = gateway.list_history(&member.user_id)?;
    let written = if path == Path::new("-") {
        export_history_csv(&records, io::stdout().lock())?
    } else {
        export_history_csv(&records, File::create(path)?)?
    };
    info!(user_id = %member.user_id, written, path = %path.display(), "exported history");
    Ok(written)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config_store = FileConfigStore::new();

    if cli.logout {
        logging::init_stderr();
        let mut cfg = config_store.load();
        cfg.user_id = None;
        config_store.save(&cfg)?;
        eprintln!("logged out ({})", config_store.path().display());
        return Ok(());
    }

    let cfg = cli.apply(config_store.load());
    if cli.remember {
        remember_identity(&config_store, &cfg)?;
        eprintln!("saved login to {}", config_store.path().display());
    }

    if cli.list_exercises {
        logging::init_stderr();
        list_exercises(cli.muscle_group, &mut io::stdout().lock())?;
        return Ok(());
    }

    if let Some(path) = &cli.export_history {
        logging::init_stderr();
        let gateway = open_gateway(&cfg)?;
        let written = export_history(&gateway, &AuthState::from_config(&cfg), path)?;
        eprintln!("exported {written} workouts");
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        logging::init_file(&log_path)?;
    }

    let gateway = open_gateway(&cfg)?;
    let mut app = App::new(
        Box::new(gateway),
        AuthState::from_config(&cfg),
        cfg.confirm_cancel,
    )?;
    if !app.auth.is_logged_in() {
        app.set_info("Browsing as guest. Restart with --user <ID> to save workouts.");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::every_second());
    let result = run_app(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.controller.is_running() {
        info!("quit with a workout still running; it was not saved");
    }
    result?;
    Ok(())
}
