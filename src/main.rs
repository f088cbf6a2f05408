//! infobox: edit infobox callouts in markdown documents from the terminal.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use infobox::app_state::{self, AppState, Verb, View};
use infobox::config::{self, Config};
use infobox::formats::markdown::MarkdownFormat;
use infobox::reorder::DragPhase;
use infobox::session::Session;
use infobox::store::{DocumentStore, FsStore};
use infobox::ui;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "infobox")]
#[command(about = "Structured infobox editing for markdown callouts", long_about = None)]
struct Args {
    /// Document to edit
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Print the render pass as JSON and exit
    #[arg(long)]
    dump: bool,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    if let Some(log) = &args.log {
        init_logging(log)?;
    }
    let cfg = Config::load();

    if args.dump {
        let text = FsStore.read(&args.path).map_err(io::Error::other)?;
        let mut session = Session::new();
        let pass = session
            .render(&args.path, &text, &MarkdownFormat)
            .map_err(io::Error::other)?;
        let json = serde_json::to_string_pretty(pass).map_err(io::Error::other)?;
        println!("{json}");
        return Ok(());
    }

    let state = AppState::new(args.path, cfg, PathBuf::from(config::CONFIG_FILE))
        .map_err(io::Error::other)?;
    if state.entries.is_empty() {
        eprintln!("No infobox callouts found");
        return Ok(());
    }

    run_tui(state)
}

fn run_tui(mut app: AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }
    Ok(())
}

fn trigger<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    verb: Verb,
) {
    let Some(action) = app.action_for(verb) else {
        app.message = Some("Not available here".to_string());
        return;
    };
    let mut prompt = ui::FormPrompt::new(terminal);
    if let Err(e) = app.run_action(&action, &mut prompt) {
        app.message = Some(format!("Error: {e}"));
    }
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut app_state::AppState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let moving = app.move_state() != DragPhase::None;

        match app.current_view {
            View::List => match key.code {
                KeyCode::Char('q') if !moving => return Ok(()),
                KeyCode::Up if ctrl => {
                    if moving {
                        app.move_up();
                    } else {
                        app.start_move();
                    }
                }
                KeyCode::Down if ctrl => {
                    if moving {
                        app.move_down();
                    } else {
                        app.start_move();
                    }
                }
                KeyCode::Up | KeyCode::Char('k') if !moving => {
                    app.message = None;
                    app.select_prev();
                }
                KeyCode::Down | KeyCode::Char('j') if !moving => {
                    app.message = None;
                    app.select_next();
                }
                KeyCode::Left | KeyCode::Char('h') if !moving => {
                    if let Some(parent) = app.navigate_to_parent() {
                        app.current_entry_index = parent;
                    }
                }
                KeyCode::Enter if moving => {
                    if let Err(e) = app.save_move() {
                        app.message = Some(format!("Error saving: {e}"));
                    }
                }
                KeyCode::Esc if moving => app.cancel_move(),
                KeyCode::Char('a') if !moving => trigger(terminal, app, Verb::Add),
                KeyCode::Char('e') if !moving => trigger(terminal, app, Verb::Edit),
                KeyCode::Char('d') if !moving => trigger(terminal, app, Verb::Delete),
                KeyCode::Char('l') if !moving => trigger(terminal, app, Verb::ToggleLock),
                KeyCode::Char('r') if !moving => {
                    if let Err(e) = app.reload() {
                        app.message = Some(format!("Error reloading: {e}"));
                    }
                }
                KeyCode::Char(':') => {
                    app.current_view = View::Command;
                    app.command_buffer.clear();
                    app.message = None;
                }
                _ => {}
            },
            View::Command => match key.code {
                KeyCode::Char(c) => app.command_buffer.push(c),
                KeyCode::Backspace => {
                    app.command_buffer.pop();
                }
                KeyCode::Enter => {
                    if app.execute_command() {
                        return Ok(());
                    }
                }
                KeyCode::Esc => {
                    app.current_view = View::List;
                    app.command_buffer.clear();
                }
                _ => {}
            },
        }
    }
}
