mod activity;
mod export;
mod fetch;
mod gate;
mod page;
mod render;
mod session;
mod tracker;

pub use activity::{Activity, ActivityType, Block, BlockParent, BlockProgress};
pub use export::serialize_block;
pub use fetch::{get_block, parse_block};
pub use gate::{complete_block, AchievementQueue, FinishError, FinishOutcome, QueueStep};
pub use page::{sequence, Page, PageContent, PageKind};
pub use render::{render_page, PageView};
pub use session::{BlockSession, SessionError};
pub use tracker::{is_video_ended, CompletionTracker, TrackerError, Transition, VIDEO_END_EPSILON_SECS};
