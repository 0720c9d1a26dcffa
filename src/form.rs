//! Create-todo form state and operations.
//!
//! `CreateTodoScreen` is the model behind the screen: the form fields, the
//! in-flight flag, the error line and the success dialog. It knows nothing
//! about terminals. `screen.rs` feeds it key presses and renders it, and
//! `main.rs` drives it headlessly for the `create` subcommand.
//!
//! The submit flow is split in two so the event loop can keep redrawing while
//! the request is in flight:
//!
//! ```text
//!   begin_submit() ──► Some(payload) ──► TodoApi::create_todo ──► finish_submit(result)
//!        │
//!        └─► None (already submitting, invalid form, or non-numeric user ID)
//! ```
//!
//! `submit()` chains both halves for callers that can simply `.await`.

// ── Imports ─────────────────────────────────────────────────────────────────

// `tracing` macros emit structured events: `info!(id = todo.id, "...")` records
// `id` as a field, not as text baked into the message. Where the events end up
// is decided once, in `main.rs`.
use tracing::{error, info, warn};

use crate::api::{CreatedTodo, TodoApi, TodoPayload};
use crate::error::{ApiError, FormError};
// Only the trait is imported: the operations below take `&mut impl Router`,
// so any navigator works, including the test doubles.
use crate::router::Router;

/// Longest title accepted from the keyboard.
pub const TITLE_MAX_LEN: usize = 100;
/// Longest user ID accepted from the keyboard.
pub const USER_ID_MAX_LEN: usize = 5;
/// User ID pre-filled when the screen opens.
pub const DEFAULT_USER_ID: &str = "1";

// ── Text input ───────────────────────────────────────────────────────────────

/// A single-line text value with a cursor.
///
/// The cursor counts *characters*, not bytes, so editing stays correct for
/// non-ASCII titles. `max_len` only limits `insert`; `set` stores whatever it
/// is given.
#[derive(Debug, Clone)]
pub struct TextInput {
    value: String,
    cursor: usize,
    max_len: usize,
}

impl TextInput {
    pub fn new(initial: impl Into<String>, max_len: usize) -> Self {
        let value = initial.into();
        let cursor = value.chars().count();
        Self {
            value,
            cursor,
            max_len,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole value and move the cursor to the end.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    /// Insert a character at the cursor. Returns `false` if the field is full.
    pub fn insert(&mut self, c: char) -> bool {
        if self.value.chars().count() >= self.max_len {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
        true
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Byte offset of the `n`th character (or the end of the string).
    ///
    /// `String::insert`/`remove` take byte offsets and panic off a UTF-8
    /// boundary, so every edit goes through this conversion.
    fn byte_index(&self, n: usize) -> usize {
        self.value
            .char_indices()
            .nth(n)
            .map_or(self.value.len(), |(i, _)| i)
    }
}

// ── Focus ────────────────────────────────────────────────────────────────────

/// Which control has keyboard focus, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    UserId,
    Completed,
    Cancel,
    Create,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Title => Field::UserId,
            Field::UserId => Field::Completed,
            Field::Completed => Field::Cancel,
            Field::Cancel => Field::Create,
            Field::Create => Field::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Field::Title => Field::Create,
            Field::UserId => Field::Title,
            Field::Completed => Field::UserId,
            Field::Cancel => Field::Completed,
            Field::Create => Field::Cancel,
        }
    }
}

// ── Dialog ───────────────────────────────────────────────────────────────────

/// A message with a single acknowledgment action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
}

impl ConfirmDialog {
    fn created(todo: &CreatedTodo) -> Self {
        Self {
            title: "Success".into(),
            message: format!("Todo created successfully with ID: {}", todo.id),
        }
    }
}

// ── Screen state ─────────────────────────────────────────────────────────────

/// All state owned by the create-todo screen.
///
/// The form values and the in-flight flag are private: they only change
/// through the setters and the submit operations below, which is what keeps
/// `is_submitting` honest.
#[derive(Debug, Clone)]
pub struct CreateTodoScreen {
    title: TextInput,
    user_id: TextInput,
    completed: bool,
    is_submitting: bool,
    error: Option<FormError>,
    dialog: Option<ConfirmDialog>,
    /// Focused control. Purely presentational, so the key handler moves it freely.
    pub field: Field,
}

// `Default` lets callers write `CreateTodoScreen::default()` and lets the
// struct sit inside other `#[derive(Default)]` types.
impl Default for CreateTodoScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateTodoScreen {
    pub fn new() -> Self {
        Self::with_user_id(DEFAULT_USER_ID)
    }

    /// A fresh form with a custom pre-filled user ID.
    pub fn with_user_id(user_id: impl Into<String>) -> Self {
        Self {
            title: TextInput::new("", TITLE_MAX_LEN),
            user_id: TextInput::new(user_id, USER_ID_MAX_LEN),
            completed: false,
            is_submitting: false,
            error: None,
            dialog: None,
            field: Field::Title,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn title(&self) -> &str {
        self.title.value()
    }

    pub fn user_id(&self) -> &str {
        self.user_id.value()
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn error(&self) -> Option<FormError> {
        self.error
    }

    pub fn dialog(&self) -> Option<&ConfirmDialog> {
        self.dialog.as_ref()
    }

    pub fn title_input(&self) -> &TextInput {
        &self.title
    }

    pub fn user_id_input(&self) -> &TextInput {
        &self.user_id
    }

    /// Mutable access for keystroke editing. The length caps live in `TextInput`.
    pub fn title_input_mut(&mut self) -> &mut TextInput {
        &mut self.title
    }

    pub fn user_id_input_mut(&mut self) -> &mut TextInput {
        &mut self.user_id
    }

    // ── Setters ──────────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title.set(title);
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id.set(user_id);
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    // ── Derived state ────────────────────────────────────────────────────

    /// Both required fields are non-blank. Says nothing about whether the
    /// user ID is numeric; that is checked on submit.
    pub fn is_form_valid(&self) -> bool {
        !self.title().trim().is_empty() && !self.user_id().trim().is_empty()
    }

    /// Whether the Create control accepts presses right now.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting && self.is_form_valid()
    }

    // ── Submit ───────────────────────────────────────────────────────────

    /// Validate the form and, if it passes, mark a request as in flight and
    /// return the payload to send.
    ///
    /// Returns `None` without touching anything while a request is already
    /// in flight. Validation failures set the error line and also return `None`.
    pub fn begin_submit(&mut self) -> Option<TodoPayload> {
        if self.is_submitting {
            return None;
        }

        if !self.is_form_valid() {
            self.error = Some(FormError::Validation);
            return None;
        }

        // `let ... else`: bind `user_id` if the pattern matches, otherwise run
        // the `else` block, which must leave the function.
        let Ok(user_id) = self.user_id().trim().parse::<i64>() else {
            self.error = Some(FormError::Format);
            return None;
        };

        self.is_submitting = true;
        self.error = None;

        let payload = TodoPayload {
            title: self.title().trim().to_string(),
            completed: self.completed,
            user_id,
        };
        info!(
            title = %payload.title,
            user_id = payload.user_id,
            completed = payload.completed,
            "submitting todo"
        );
        Some(payload)
    }

    /// Apply the outcome of the request started by `begin_submit`.
    ///
    /// The in-flight flag is cleared on every path.
    pub fn finish_submit(&mut self, result: Result<Option<CreatedTodo>, ApiError>) {
        if !self.is_submitting {
            warn!("ignoring create result with no request in flight");
            return;
        }

        // Nested patterns take the result apart in one `match`: a record, a
        // successful call without one, and a failure.
        match result {
            Ok(Some(todo)) => {
                info!(id = todo.id, "todo created");
                self.dialog = Some(ConfirmDialog::created(&todo));
            }
            Ok(None) => {
                warn!("create returned no record");
                self.error = Some(FormError::EmptyResult);
            }
            Err(err) => {
                error!(error = %err, "failed to create todo");
                self.error = Some(FormError::Transport);
            }
        }

        self.is_submitting = false;
    }

    /// `begin_submit`, await the API, `finish_submit`.
    ///
    /// Returns `true` if the API was called.
    ///
    /// Generic over `A`: `&dyn TodoApi` does not exist, since a trait method
    /// returning `impl Future` makes the trait not object-safe.
    pub async fn submit<A: TodoApi>(&mut self, api: &A) -> bool {
        let Some(payload) = self.begin_submit() else {
            return false;
        };
        let result = api.create_todo(payload).await;
        self.finish_submit(result);
        true
    }

    // ── Navigation ───────────────────────────────────────────────────────

    /// Leave the screen without creating anything. Disabled while submitting.
    pub fn cancel(&mut self, router: &mut impl Router) -> bool {
        if self.is_submitting {
            return false;
        }
        router.back();
        true
    }

    /// Dismiss the success dialog, which always navigates back.
    pub fn acknowledge_dialog(&mut self, router: &mut impl Router) -> bool {
        if self.dialog.take().is_none() {
            return false;
        }
        router.back();
        true
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
