pub mod model;

pub use model::{HistoryEntry, SessionSnapshot, SessionState, HISTORY_LIMIT};
