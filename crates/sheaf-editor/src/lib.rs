//! Collection editing for sheaf.
//!
//! This crate is the glue between a UI shell and the collection model. The
//! shell turns user input into [`EditorEvent`]s; [`CollectionEditor`] applies
//! them through the transfer engine, saves the slot list, and reports
//! rejections as warnings instead of errors.
//!
//! # Key Types
//!
//! - [`CollectionEditor`] -- Applies events to collections
//! - [`StrategyRegistry`] -- Element kind to [`EditStrategy`] lookup, built up front
//! - [`SessionMap`] -- Per-collection UI state with explicit open/close
//! - [`Layout`] -- Row metrics and the required display height
//! - [`EditorConfig`] -- Transfer and layout settings, loadable from TOML

pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod layout;
pub mod session;
pub mod strategy;

pub use config::EditorConfig;
pub use editor::{CollectionEditor, RowView};
pub use error::{EditorError, EditorResult};
pub use event::{EditorEvent, EditorOutcome};
pub use layout::Layout;
pub use session::{SessionMap, SessionState};
pub use strategy::{DefaultStrategy, EditStrategy, StrategyRegistry};
