//! agterm-core: session resolution and output tracking.
//! Pure logic over point-in-time session snapshots: no IO, no async.

pub mod fuzzy;
pub mod output;
pub mod resolver;
pub mod scrub;
pub mod types;

pub use fuzzy::{ACCEPT_THRESHOLD, FuzzyMatch, SUBSTRING_BONUS, rank};
pub use output::{WatchCursor, WatchDelta, last_lines, normalize_snapshot, trim_trailing_blank};
pub use resolver::{FIND_LIMIT, MatchedBy, Resolution, ScoredSession, find_by_name, resolve};
pub use scrub::scrub;
pub use types::{NotFoundError, Session};
