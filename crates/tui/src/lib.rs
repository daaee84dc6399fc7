//! Interactive terminal picker UI for `hop`.
//!
//! Presents the catalog as a searchable table with add/edit/delete forms and
//! a delete confirmation, re-ranking on every keystroke through the engine.
//! The UI owns no engine state beyond the current snapshot; it hands the
//! final selection back to the caller and leaves launching to them.

mod app;
mod render;

pub use app::{App, Importer, Outcome, run};
