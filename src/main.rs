mod api;
mod app;
mod logging;
mod model;
mod nav;
mod store;
mod ui;

use api::{PhotoSource, UnsplashClient};
use app::App;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use nav::Screen;
use std::path::PathBuf;
use store::ResultStore;

/// TUI browser for dog photos from the Unsplash search API
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Unsplash access key, sent as `client_id`
    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "DOG_ADOPT_BASE_URL", default_value = api::DEFAULT_BASE_URL)]
    base_url: String,

    /// Log filter directive, e.g. `debug` or `dog_adopt=trace`
    #[arg(long, env = "DOG_ADOPT_LOG", default_value = "info")]
    log_level: String,

    /// Log file path (defaults to the user cache directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Abort the in-flight fetch when leaving the list
    #[arg(long)]
    cancel_on_exit: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.clone().or_else(logging::default_log_path) {
        logging::init(&cli.log_level, &path);
    }
    tracing::info!(base_url = %cli.base_url, "starting");

    let client = UnsplashClient::new(&cli.base_url, cli.api_key)?;
    let store = ResultStore::new(client);
    let mut app = App::new(store, cli.cancel_on_exit);

    // Init terminal
    let mut terminal = ratatui::init();

    // First paint happens before the fetch completes.
    app.enter_list();
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    ratatui::restore();

    if let Err(e) = result {
        tracing::error!(error = %e, "event loop failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    tracing::info!("bye");
    Ok(())
}

fn run_app<S: PhotoSource>(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Repaint only on store updates and input; every paint re-rolls the
    // fallback ages.
    let mut dirty = true;
    loop {
        dirty |= app.drain_updates();
        dirty |= app.poll_fetch_state();
        if dirty {
            terminal.draw(|frame| ui::render(app, frame))?;
            dirty = false;
        }

        if app.should_quit {
            return Ok(());
        }

        // Poll for events with a 250ms timeout
        if event::poll(std::time::Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key);
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
}

fn handle_key<S: PhotoSource>(app: &mut App<S>, key: KeyEvent) {
    // Help toggle (global)
    if key.code == KeyCode::Char('?') {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.nav.screen() {
        Screen::List => handle_list_key(app, key),
        Screen::Detail => handle_detail_key(app, key),
    }
}

fn handle_list_key<S: PhotoSource>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.list_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.list_prev();
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.list_first();
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.list_last();
        }
        KeyCode::Enter => {
            app.open_detail();
        }
        KeyCode::Char('r') => {
            app.enter_list();
        }
        _ => {}
    }
}

fn handle_detail_key<S: PhotoSource>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
            app.go_back();
        }
        KeyCode::Char('l') => {
            app.like();
        }
        _ => {}
    }
}
