//! The UI renders the application state into something visible.
//!
//! The list view shows the infobox tree using box-drawing characters. Prompts are drawn as a
//! modal form over a cleared screen and run their own small event loop until the user submits
//! or cancels.

use crate::actions::{ActionState, Form, Prompt};
use crate::app_state::{AppState, Entry, EntryKind, View};
use crate::reorder::DragPhase;
use ratatui::{
    backend::Backend,
    crossterm::event::{self, Event, KeyCode, KeyEventKind},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame, Terminal,
};

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    draw_list(f, app, chunks[0]);

    let bottom = match app.current_view {
        View::Command => Paragraph::new(format!(":{}", app.command_buffer))
            .block(Block::default().borders(Borders::ALL).title("Command")),
        View::List => Paragraph::new(help_text(app)).block(Block::default().borders(Borders::ALL)),
    };
    f.render_widget(bottom, chunks[1]);
}

/// Generate box-drawing prefix for tree structure
fn get_tree_prefix(level: usize, is_last: bool, parent_states: &[bool]) -> String {
    if level == 0 {
        return String::new();
    }

    let mut prefix = String::new();

    // Draw vertical lines for parent levels
    for i in 0..level.saturating_sub(1) {
        if i < parent_states.len() && parent_states[i] {
            prefix.push_str("│   ");
        } else {
            prefix.push_str("    ");
        }
    }

    if is_last {
        prefix.push_str("└── ");
    } else {
        prefix.push_str("├── ");
    }

    prefix
}

fn last_at_depth(entries: &[Entry]) -> Vec<bool> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            !entries[i + 1..]
                .iter()
                .take_while(|next| next.depth >= entry.depth)
                .any(|next| next.depth == entry.depth)
        })
        .collect()
}

fn entry_line(entry: &Entry, prefix: String) -> Line<'static> {
    let mut spans = vec![Span::raw(prefix)];
    match entry.kind {
        EntryKind::Infobox => {
            let icon = if entry.detail == "locked" { "🔒" } else { "🔓" };
            spans.push(Span::styled(
                format!("{icon} {}", entry.label),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        EntryKind::Group => {
            spans.push(Span::styled(
                entry.label.clone(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" ({})", entry.detail),
                Style::default().fg(Color::DarkGray),
            ));
        }
        EntryKind::Row => {
            spans.push(Span::raw(format!("{}: ", entry.label)));
            let style = if entry.detail == "(missing)" {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            };
            spans.push(Span::styled(entry.detail.clone(), style));
        }
    }
    Line::from(spans)
}

fn draw_list(f: &mut Frame, app: &AppState, area: Rect) {
    let is_last = last_at_depth(&app.entries);
    let mut parent_has_siblings: Vec<bool> = Vec::new();

    let items: Vec<ListItem> = app
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            parent_has_siblings.truncate(entry.depth);
            while parent_has_siblings.len() < entry.depth {
                parent_has_siblings.push(false);
            }
            if let Some(last) = parent_has_siblings.last_mut() {
                *last = !is_last[i];
            }
            let prefix = get_tree_prefix(entry.depth, is_last[i], &parent_has_siblings);

            let style = if app.is_moving(entry) {
                match app.move_state() {
                    DragPhase::Selected => Style::default()
                        .fg(Color::Rgb(255, 165, 0)) // Orange
                        .add_modifier(Modifier::BOLD),
                    DragPhase::Moved => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    DragPhase::None => Style::default(),
                }
            } else if i == app.current_entry_index {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };

            ListItem::new(entry_line(entry, prefix)).style(style)
        })
        .collect();

    let name = app
        .document()
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    let title = match app.move_state() {
        DragPhase::None => format!("Infoboxes: {name}"),
        _ => format!("Infoboxes: {name} (MOVING)"),
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn help_text(app: &AppState) -> String {
    if let ActionState::AwaitingInput(name) = app.action_state {
        return format!("Waiting for input: {name}");
    }
    if let Some(message) = &app.message {
        return message.clone();
    }
    if app.move_state() == DragPhase::None {
        "↑/↓: Navigate | a: Add | e: Edit | d: Delete | l: Lock/Unlock | Ctrl+↑/↓: Move | q: Quit"
            .to_string()
    } else {
        "Ctrl+↑/↓: Move | Enter / :w Save | Esc: Cancel".to_string()
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Draw `form` with the given answers, `focus` marking the field being typed into.
pub fn draw_form(f: &mut Frame, form: &Form, values: &[String], focus: usize) {
    let rows = u16::try_from(form.fields.len()).unwrap_or(u16::MAX);
    let area = centered(f.area(), 60, rows.saturating_mul(3).saturating_add(5));
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(form.title.clone());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(3); form.fields.len()];
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, (field, value)) in form.fields.iter().zip(values).enumerate() {
        let style = if field.locked {
            Style::default().fg(Color::DarkGray)
        } else if i == focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let text = if i == focus && !field.locked {
            format!("{value}▏")
        } else {
            value.clone()
        };
        let input = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(field.label));
        f.render_widget(input, chunks[i]);
    }

    let help = Paragraph::new("Tab: Next | Enter: Confirm | Esc: Cancel")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[chunks.len() - 1]);
}

/// Modal prompt drawn on the terminal.
pub struct FormPrompt<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
}

impl<'a, B: Backend> FormPrompt<'a, B> {
    /// Prompt that draws on `terminal`.
    pub fn new(terminal: &'a mut Terminal<B>) -> Self {
        Self { terminal }
    }

    fn next_field(form: &Form, from: usize, forward: bool) -> usize {
        let count = form.fields.len();
        (1..=count)
            .map(|step| {
                if forward {
                    (from + step) % count
                } else {
                    (from + count - step % count) % count
                }
            })
            .find(|&i| !form.fields[i].locked)
            .unwrap_or(from)
    }

    fn run(&mut self, form: &Form) -> std::io::Result<Option<Vec<String>>> {
        let mut values: Vec<String> = form.fields.iter().map(|f| f.value.clone()).collect();
        let mut focus = form
            .fields
            .iter()
            .position(|f| !f.locked)
            .unwrap_or_default();
        loop {
            self.terminal
                .draw(|f| draw_form(f, form, &values, focus))?;
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let editable = form.fields.get(focus).is_some_and(|f| !f.locked);
            match key.code {
                KeyCode::Esc => return Ok(None),
                KeyCode::Enter => return Ok(Some(values)),
                KeyCode::Tab | KeyCode::Down => focus = Self::next_field(form, focus, true),
                KeyCode::BackTab | KeyCode::Up => focus = Self::next_field(form, focus, false),
                KeyCode::Backspace if editable => {
                    values[focus].pop();
                }
                KeyCode::Char(c) if editable => values[focus].push(c),
                _ => {}
            }
        }
    }
}

impl<B: Backend> Prompt for FormPrompt<'_, B> {
    fn prompt(&mut self, form: &Form) -> Option<Vec<String>> {
        match self.run(form) {
            Ok(answers) => answers,
            Err(e) => {
                tracing::warn!("prompt failed: {e}");
                None
            }
        }
    }
}
