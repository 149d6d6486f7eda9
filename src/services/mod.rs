//! Domain services behind the `WidgetStore` facade.
//!
//! ARCHITECTURE
//! ============
//! `widgets` owns validation, uniqueness, and merge rules over the
//! in-memory database; `persistence` owns getting that database to the
//! backend. The facade in `store` only wires the two together.

pub mod persistence;
pub mod widgets;
