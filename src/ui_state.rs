//! UI state for the widget editor: log/error output, busy indicator, and
//! the active visualization with its chart or graph model.
//!
//! Plain last-write-wins data. [`SharedUiState`] publishes every change
//! through a `watch` channel so display layers can re-render.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

pub const DEFAULT_VISUALIZATION: &str = "graph";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub graph_model: Option<Value>,
    pub chart_data: Option<Value>,
    pub chart_options: Option<Value>,
    pub log: Option<String>,
    pub error: Option<String>,
    pub is_busy: bool,
    pub busy_message: Option<String>,
    pub visualization: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            graph_model: None,
            chart_data: None,
            chart_options: None,
            log: None,
            error: None,
            is_busy: false,
            busy_message: None,
            visualization: DEFAULT_VISUALIZATION.to_owned(),
        }
    }
}

impl UiState {
    pub fn set_graph_model(&mut self, model: Option<Value>) {
        self.graph_model = model;
    }

    pub fn set_chart(&mut self, data: Option<Value>, options: Option<Value>) {
        self.chart_data = data;
        self.chart_options = options;
    }

    pub fn set_log(&mut self, log: impl Into<String>) {
        self.log = Some(log.into());
    }

    pub fn append_to_log(&mut self, msg: &str) {
        let log = self.log.get_or_insert_with(String::new);
        log.push('\n');
        log.push_str(msg);
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    /// Errors render as HTML, so line breaks become `<br>`.
    pub fn append_to_error(&mut self, msg: &str) {
        let error = self.error.get_or_insert_with(String::new);
        error.push_str("<br>");
        error.push_str(&msg.replace('\n', "<br>"));
    }

    /// Busy exactly when a message is given.
    pub fn set_busy(&mut self, message: Option<String>) {
        self.is_busy = message.is_some();
        self.busy_message = message;
    }

    /// Switch renderer. Clears the previous renderer's model.
    pub fn set_visualization(&mut self, name: impl Into<String>) {
        self.visualization = name.into();
        self.chart_data = None;
        self.chart_options = None;
        self.graph_model = None;
    }

    pub fn clear_log(&mut self) {
        self.log = Some(String::new());
    }

    pub fn clear_errors(&mut self) {
        self.error = Some(String::new());
    }

    pub fn reset_output(&mut self) {
        self.clear_errors();
        self.clear_log();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// SHARED UI STATE
// =============================================================================

/// Observable handle around [`UiState`]. Clones publish to the same
/// subscribers.
#[derive(Clone, Debug)]
pub struct SharedUiState {
    tx: Arc<watch::Sender<UiState>>,
}

impl Default for SharedUiState {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}

impl SharedUiState {
    #[must_use]
    pub fn new(initial: UiState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Apply `mutate` and notify subscribers.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut UiState),
    {
        self.tx.send_modify(mutate);
    }

    #[must_use]
    pub fn snapshot(&self) -> UiState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[path = "ui_state_test.rs"]
mod tests;
