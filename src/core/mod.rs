/// Plumbing shared by the dashboard and headless mode
///
/// - Message types passed between tasks and threads
/// - The replay clock
/// - Spawning of the acquisition and ingest tasks
pub mod bus;
pub mod clock;
pub mod runtime;
pub mod task_manager;

pub use bus::{Bus, FeedEvent, FeedEventKind, UiToCore};
pub use clock::{format_elapsed, Clock, ManualClock, WallClock};
pub use runtime::{start_replay, Replay};
