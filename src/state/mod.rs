/// State management module
///
/// This module handles all application state, including:
/// - The story data model (data.rs)
/// - The story store and viewing cursor (store.rs)
/// - The viewer playback state machine (viewer.rs)
/// - The persisted story record (library.rs)
/// - Time sources and time labels (clock.rs, expiry.rs)
/// - Transient upload notices (notice.rs)

pub mod clock;
pub mod data;
pub mod expiry;
pub mod library;
pub mod notice;
pub mod store;
pub mod viewer;
