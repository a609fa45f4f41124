//! Domain logic for the Podium booking console: path-addressed records,
//! section-scoped editing, completion scoring, and status lifecycles.
//!
//! This crate performs no I/O. Persistence lives in `podium-client`.

pub mod binding;
pub mod checklist;
pub mod completion;
pub mod dashboard;
pub mod dirty;
pub mod editor;
pub mod error;
pub mod field;
pub mod layouts;
pub mod record;
pub mod status;
pub mod types;
