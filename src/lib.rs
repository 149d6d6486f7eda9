//! Local persistence for user-authored widgets.
//!
//! DESIGN
//! ======
//! `WidgetStore` is the only gateway to the durable widget collection. It
//! validates and normalizes every input, keeps ids unique, merges upserts
//! shallowly, and mirrors the in-memory database to a single JSON file
//! through a background autosave task.
//!
//! ```no_run
//! # async fn demo() -> Result<(), widgetstore::StoreError> {
//! use widgetstore::{StoreConfig, WidgetPatch, WidgetStore};
//!
//! let store = WidgetStore::init(StoreConfig::default()).await?;
//! let widget = store.add_item(&WidgetPatch::default().text("Sales chart")).await?;
//! store
//!     .upsert_item(&WidgetPatch::with_id(&widget.id).visualization("chart"))
//!     .await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
mod services;
mod state;
pub mod store;
pub mod ui_state;
pub mod widget;

pub use config::StoreConfig;
pub use db::backend::{Backend, FileBackend, MemoryBackend};
pub use error::{BackendError, ErrorCode, StoreError};
pub use services::widgets::WIDGET_COLLECTION;
pub use store::WidgetStore;
pub use ui_state::{SharedUiState, UiState};
pub use widget::{Widget, WidgetPatch, WidgetSummary};
