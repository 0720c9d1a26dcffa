//! Interactive create-todo screen.
//!
//! Renders a `CreateTodoScreen` as a centered card, routes key presses to it,
//! and runs the event loop that owns the terminal for the lifetime of the
//! screen. The API call runs in a spawned task whose `JoinHandle` the loop
//! awaits alongside terminal input, so the card keeps redrawing (and the
//! spinner keeps turning) while the request is in flight.

// ── Imports ─────────────────────────────────────────────────────────────────

// `Arc` (atomically reference-counted pointer) lets the loop and the spawned
// request task share one `TodoApi`. `Arc::clone` only bumps a counter; the
// client itself is never copied.
use std::sync::Arc;

use anyhow::Result;
// Crossterm terminal control:
// - `Event`/`EventStream`: async stream of keyboard, mouse, and resize events
// - `KeyCode`/`KeyEvent`/`KeyEventKind`/`KeyModifiers`: key event details
// - `enable_raw_mode`/`disable_raw_mode`: immediate key delivery, no echo
// - `EnterAlternateScreen`/`LeaveAlternateScreen`: draw on a separate buffer
//   so the user's scrollback is untouched when the screen closes
use crossterm::{
    event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
// `StreamExt` is an extension trait: importing it adds `.next()` to every
// `Stream`, which is how the loop pulls the next terminal event.
use n0_future::StreamExt;
// Ratatui rendering. `Terminal<B>` is generic over its `Backend`, so the same
// loop draws to a real terminal (`CrosstermBackend`) or to an in-memory
// `TestBackend` in tests.
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
// `JoinHandle` is the owned handle to a spawned task. Awaiting it yields the
// task's return value, or a `JoinError` if the task panicked or was aborted.
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Duration, interval};
// The `Stream` trait itself (the async counterpart of `Iterator`). The event
// loop is generic over it so tests can script key presses.
use tokio_stream::Stream;
use tracing::{info, warn};

use crate::api::{CreatedTodo, TodoApi, TodoPayload};
use crate::error::ApiError;
use crate::form::{CreateTodoScreen, Field, TextInput};
use crate::router::{Router, TerminalRouter};
use crate::theme::Theme;

/// Braille spinner shown in place of the Create label while submitting.
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const CARD_W: u16 = 56;
const CARD_H: u16 = 17;
/// Columns before a field's value ("    ").
const INPUT_INDENT: u16 = 4;

// ── Exit ─────────────────────────────────────────────────────────────────────

/// How the screen was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenExit {
    /// A todo was created and the confirmation acknowledged. Carries the
    /// confirmation message.
    Created(String),
    /// The user cancelled.
    Cancelled,
    /// Ctrl+C, or the terminal event stream ended.
    Aborted,
}

// ── Key handling ─────────────────────────────────────────────────────────────

/// What the event loop must do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    Nothing,
    /// Start the API call with this payload.
    Dispatch(TodoPayload),
    /// Leave immediately, abandoning any in-flight request.
    ForceQuit,
}

/// Handle a key press on the create-todo screen.
///
/// Dispatch order: global shortcuts (Ctrl+C, Ctrl+T), then the modal
/// dialog if one is open, then focus movement, then the focused control.
///
/// `router: &mut impl Router` is shorthand for a generic parameter
/// `R: Router`, so tests can pass their own navigator.
pub fn handle_key(
    screen: &mut CreateTodoScreen,
    router: &mut impl Router,
    theme: &mut Theme,
    key: KeyEvent,
) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // `if ctrl` after a pattern is a match guard: the arm only matches when
    // the guard also holds, otherwise matching falls through to later arms.
    match key.code {
        KeyCode::Char('c') if ctrl => return KeyAction::ForceQuit,
        KeyCode::Char('t') if ctrl => {
            theme.toggle();
            return KeyAction::Nothing;
        }
        _ => {}
    }

    // The success dialog is modal: it swallows every key, and the
    // acknowledging ones navigate back.
    if screen.dialog().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            screen.acknowledge_dialog(router);
        }
        return KeyAction::Nothing;
    }

    match key.code {
        KeyCode::Esc => {
            screen.cancel(router);
            KeyAction::Nothing
        }
        KeyCode::Char('s') if ctrl => submit(screen),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
            screen.field = screen.field.prev();
            KeyAction::Nothing
        }
        KeyCode::Tab | KeyCode::Down => {
            screen.field = screen.field.next();
            KeyAction::Nothing
        }
        KeyCode::BackTab | KeyCode::Up => {
            screen.field = screen.field.prev();
            KeyAction::Nothing
        }
        KeyCode::Enter => match screen.field {
            Field::Title | Field::UserId => submit(screen),
            Field::Completed => {
                screen.toggle_completed();
                KeyAction::Nothing
            }
            Field::Cancel => {
                screen.cancel(router);
                KeyAction::Nothing
            }
            // The button is disabled while submitting or while the form is
            // incomplete, so pressing it then does nothing.
            Field::Create if screen.can_submit() => submit(screen),
            Field::Create => KeyAction::Nothing,
        },
        _ => {
            match screen.field {
                Field::Title => edit_text(screen.title_input_mut(), key),
                Field::UserId => edit_text(screen.user_id_input_mut(), key),
                Field::Completed => match key.code {
                    KeyCode::Char(' ') => screen.toggle_completed(),
                    KeyCode::Left => screen.set_completed(false),
                    KeyCode::Right => screen.set_completed(true),
                    _ => {}
                },
                Field::Cancel | Field::Create => match key.code {
                    KeyCode::Left => screen.field = Field::Cancel,
                    KeyCode::Right => screen.field = Field::Create,
                    _ => {}
                },
            }
            KeyAction::Nothing
        }
    }
}

fn submit(screen: &mut CreateTodoScreen) -> KeyAction {
    match screen.begin_submit() {
        Some(payload) => KeyAction::Dispatch(payload),
        None => KeyAction::Nothing,
    }
}

/// Single-line editing keys for a focused text field.
fn edit_text(input: &mut TextInput, key: KeyEvent) {
    match key.code {
        // Ctrl/Alt chords are shortcuts, not text.
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            input.insert(c);
        }
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
    }
}

// ── UI rendering ─────────────────────────────────────────────────────────────

/// The part of `input` that fits in `width` columns, plus the cursor column
/// inside that window. Scrolls so the cursor is always visible.
fn visible_window(input: &TextInput, width: usize) -> (String, usize) {
    let chars: Vec<char> = input.value().chars().collect();
    let cursor = input.cursor();
    if width == 0 {
        return (String::new(), 0);
    }
    // One column is reserved for the cursor sitting past the last char.
    let start = (cursor + 1).saturating_sub(width);
    let end = (start + width).min(chars.len());
    (chars[start..end].iter().collect(), cursor - start)
}

/// Focused labels are highlighted, except behind the modal dialog.
fn label_style(screen: &CreateTodoScreen, theme: &Theme, field: Field) -> Style {
    if screen.field == field && screen.dialog().is_none() {
        Style::default()
            .fg(theme.label_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.label)
    }
}

fn marker(screen: &CreateTodoScreen, field: Field) -> &'static str {
    if screen.field == field { "> " } else { "  " }
}

/// Label line plus value line for one text field.
///
/// `Line<'static>` means the lines own their text (every `Span` holds a
/// `String` or a string literal), so they outlive the borrowed `screen`.
fn text_field(
    screen: &CreateTodoScreen,
    theme: &Theme,
    field: Field,
    label: &str,
    input: &TextInput,
    placeholder: &'static str,
    width: usize,
) -> [Line<'static>; 2] {
    let label_line = Line::from(Span::styled(
        format!("{}{label}", marker(screen, field)),
        label_style(screen, theme, field),
    ));
    let value = if input.value().is_empty() {
        Span::styled(placeholder, Style::default().fg(theme.placeholder))
    } else {
        let (window, _) = visible_window(input, width);
        Span::styled(window, Style::default().fg(theme.input_text))
    };
    [label_line, Line::from(vec![Span::raw("    "), value])]
}

/// Render the create-todo card into a terminal frame.
///
/// Ratatui is immediate-mode: this runs on every loop iteration and rebuilds
/// the whole card from `screen`, with no widget state carried between frames.
pub fn ui(f: &mut Frame, screen: &CreateTodoScreen, theme: &Theme, spinner_frame: usize) {
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(theme.bg)), area);

    let card_w = CARD_W.min(area.width);
    let card_h = CARD_H.min(area.height);
    let card = Rect::new(
        area.width.saturating_sub(card_w) / 2,
        area.height.saturating_sub(card_h) / 2,
        card_w,
        card_h,
    );

    // `Clear` resets the cells under the card so nothing behind it shows through.
    f.render_widget(Clear, card);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.card_bg))
        .title(Span::styled(
            " Create New Todo ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    f.render_widget(block, card);

    let inner = Rect::new(
        card.x + 2,
        card.y + 1,
        card.width.saturating_sub(4),
        card.height.saturating_sub(2),
    );
    let field_w = inner.width.saturating_sub(INPUT_INDENT) as usize;

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    // ── Text fields ──────────────────────────────────────────────────────

    lines.extend(text_field(
        screen,
        theme,
        Field::Title,
        "Title:",
        screen.title_input(),
        "Enter todo title",
        field_w,
    ));
    lines.push(Line::from(""));
    lines.extend(text_field(
        screen,
        theme,
        Field::UserId,
        "User ID:",
        screen.user_id_input(),
        "Enter user ID",
        field_w,
    ));
    lines.push(Line::from(""));

    // ── Completed switch ─────────────────────────────────────────────────

    let (knob, knob_style, state) = if screen.completed() {
        ("━━●", Style::default().fg(theme.switch_on), "On")
    } else {
        ("●━━", Style::default().fg(theme.switch_off), "Off")
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("{}Completed:", marker(screen, Field::Completed)),
            label_style(screen, theme, Field::Completed),
        ),
        Span::raw("  "),
        Span::styled(knob, knob_style.add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(state, Style::default().fg(theme.label)),
    ]));
    lines.push(Line::from(""));

    // ── Error or hint line ───────────────────────────────────────────────

    if let Some(err) = screen.error() {
        lines.push(
            Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
        );
    } else {
        let key = |k: &'static str| {
            Span::styled(k, Style::default().fg(theme.hint_key).add_modifier(Modifier::BOLD))
        };
        let text = |t: &'static str| Span::styled(t, Style::default().fg(theme.hint_text));
        lines.push(
            Line::from(vec![
                key("Tab"),
                text(" next  "),
                key("Ctrl+S"),
                text(" create  "),
                key("Esc"),
                text(" cancel"),
            ])
            .alignment(Alignment::Center),
        );
    }
    lines.push(Line::from(""));

    // ── Buttons ──────────────────────────────────────────────────────────

    let button = |field: Field, label: String, bg: Color, enabled: bool| {
        let mut style = Style::default().bg(bg);
        style = if enabled {
            style.fg(theme.button_text).add_modifier(Modifier::BOLD)
        } else {
            style.fg(theme.button_disabled_text)
        };
        if screen.field == field {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Span::styled(label, style)
    };

    let create_label = if screen.is_submitting() {
        format!("     {}     ", SPINNER[spinner_frame % SPINNER.len()])
    } else {
        " Create Todo ".to_string()
    };
    let create_bg = if screen.can_submit() || screen.is_submitting() {
        theme.button_create_bg
    } else {
        theme.button_bg
    };
    lines.push(
        Line::from(vec![
            button(
                Field::Cancel,
                "  Cancel  ".to_string(),
                theme.button_bg,
                !screen.is_submitting(),
            ),
            Span::raw("    "),
            button(Field::Create, create_label, create_bg, screen.can_submit()),
        ])
        .alignment(Alignment::Center),
    );

    f.render_widget(Paragraph::new(lines), inner);

    // ── Overlay or cursor ────────────────────────────────────────────────

    if let Some(dialog) = screen.dialog() {
        render_dialog(f, &dialog.title, &dialog.message, theme);
        return;
    }

    let cursor_at = |input: &TextInput, row: u16| {
        let (_, col) = visible_window(input, field_w);
        (inner.x + INPUT_INDENT + col as u16, inner.y + row)
    };
    match screen.field {
        Field::Title => f.set_cursor_position(cursor_at(screen.title_input(), 2)),
        Field::UserId => f.set_cursor_position(cursor_at(screen.user_id_input(), 5)),
        _ => {}
    }
}

/// Centered modal with a single `OK` action.
fn render_dialog(f: &mut Frame, title: &str, message: &str, theme: &Theme) {
    let area = f.area();
    let w = 46.min(area.width);
    let h = 8.min(area.height);
    let rect = Rect::new(
        area.width.saturating_sub(w) / 2,
        area.height.saturating_sub(h) / 2,
        w,
        h,
    );

    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.label_focused))
        .style(Style::default().bg(theme.card_bg))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(theme.input_text)))
            .alignment(Alignment::Center),
        Line::from(""),
        Line::from(Span::styled(
            "  OK  ",
            Style::default()
                .fg(theme.button_text)
                .bg(theme.button_create_bg)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
    ];
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        rect,
    );
}

// ── Event loop ───────────────────────────────────────────────────────────────

/// Run the interactive screen until the user leaves it.
///
/// `api` is shared with the spawned request task, hence the `Arc` and the
/// `Send + Sync + 'static` bounds.
pub async fn run_create_todo_screen<A>(api: Arc<A>, screen: CreateTodoScreen) -> Result<ScreenExit>
where
    A: TodoApi + Send + Sync + 'static,
{
    enable_raw_mode()?;
    execute!(std::io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;

    // Restore the terminal whether the loop succeeded or not.
    let exit = event_loop(&mut terminal, EventStream::new(), api, screen).await;

    disable_raw_mode()?;
    execute!(std::io::stdout(), LeaveAlternateScreen)?;
    exit
}

/// The result a spawned create request produces.
type CreateResult = Result<Option<CreatedTodo>, ApiError>;

/// Await the in-flight request, or never resolve if there is none.
///
/// Borrowing the handle (instead of taking it) means a `select!` that picks
/// another branch leaves the request running; the handle is only consumed
/// once it has finished.
async fn join_in_flight(
    task: &mut Option<JoinHandle<CreateResult>>,
) -> Result<CreateResult, JoinError> {
    match task {
        // `&mut JoinHandle` is itself a future, so the handle survives being
        // polled by a cancelled `select!` branch.
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// Draw, wait for the next thing to happen, update, repeat.
///
/// Generic over the terminal backend and over the stream of terminal events,
/// so the whole loop runs against `TestBackend` and scripted keys in tests.
async fn event_loop<B, A, S>(
    terminal: &mut Terminal<B>,
    mut events: S,
    api: Arc<A>,
    mut screen: CreateTodoScreen,
) -> Result<ScreenExit>
where
    B: Backend,
    A: TodoApi + Send + Sync + 'static,
    // `Unpin` lets `.next()` poll the stream through a plain `&mut`.
    S: Stream<Item = std::io::Result<TermEvent>> + Unpin,
{
    let mut router = TerminalRouter::new();
    let mut theme = Theme::light();
    let mut tick = interval(Duration::from_millis(50));
    let mut spinner_frame = 0usize;

    // At most one request is ever outstanding: `begin_submit` refuses to
    // start a second while the first is in flight.
    let mut in_flight: Option<JoinHandle<CreateResult>> = None;

    info!("create-todo screen opened");

    // `loop` is an expression: `break value` ends it and hands `value` back,
    // so every way out of the screen is a `break ScreenExit::...` below.
    let exit = loop {
        terminal.draw(|f| ui(f, &screen, &theme, spinner_frame))?;

        // `select!` polls all branches at once and runs whichever finishes
        // first. The losing futures are dropped, which is harmless here: a
        // pending `events.next()` loses no event, and `join_in_flight` only
        // borrows the request handle.
        tokio::select! {
            ev = events.next() => {
                let key = match ev {
                    Some(Ok(TermEvent::Key(key))) => key,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                    None => break ScreenExit::Aborted,
                };
                if key.kind != KeyEventKind::Press { continue; }

                // Snapshot the dialog so a Back caused by acknowledging it can
                // be told apart from a cancel.
                let dialog = screen.dialog().cloned();

                match handle_key(&mut screen, &mut router, &mut theme, key) {
                    KeyAction::Nothing => {}
                    KeyAction::Dispatch(payload) => {
                        // The task must own everything it touches (`'static`),
                        // so it gets its own `Arc` to the API, moved in.
                        let api = Arc::clone(&api);
                        in_flight = Some(tokio::spawn(async move {
                            api.create_todo(payload).await
                        }));
                    }
                    KeyAction::ForceQuit => {
                        if let Some(task) = in_flight.take() {
                            warn!("abandoning in-flight create request");
                            task.abort();
                        }
                        break ScreenExit::Aborted;
                    }
                }

                if router.went_back() {
                    break match dialog {
                        Some(d) => ScreenExit::Created(d.message),
                        None => ScreenExit::Cancelled,
                    };
                }
            }
            joined = join_in_flight(&mut in_flight) => {
                in_flight = None;
                // A panicked task becomes an ordinary failed request, so the
                // in-flight flag is cleared either way.
                let result = joined.unwrap_or_else(|err| Err(ApiError::from(err)));
                screen.finish_submit(result);
            }
            _ = tick.tick() => {
                if screen.is_submitting() {
                    spinner_frame = spinner_frame.wrapping_add(1);
                }
            }
        }
    };

    info!(?exit, "create-todo screen closed");
    Ok(exit)
}

// ── Tests ────────────────────────────────────────────────────────────────────
