pub mod history;
pub mod ring;
pub mod sequence;
pub mod stats;
pub mod symbolize;
pub mod timebucket;
pub mod window;

pub use history::HistoryWindow;
pub use ring::RingStore;
pub use sequence::SequenceCounter;
pub use stats::{OnlineStats, StatsSnapshot};
pub use symbolize::Symbolizer;
pub use timebucket::{TimeBucket, TimeBucketer};
pub use window::{Bucket, MultiSlotWindow, SlotStats};
