/// User interface module
///
/// - `story_list.rs` - the circular story list and add button
/// - `viewer.rs` - the full-screen viewer
/// - `gesture.rs` - swipe/tap detection on a transparent canvas

pub mod gesture;
pub mod story_list;
pub mod viewer;
