//! Human-in-the-loop dialogs
//!
//! ```text
//! request   AskParams → DialogRequest (validated)
//! provider  DialogRequest → RawResult (external helper process)
//! compact   RawResult → CompactResponse (one outcome, no nulls)
//! humanize  CompactResponse → one sentence
//! session   single flight + timeout + heartbeat around all of the above
//! ```

pub mod compact;
pub mod flight;
pub mod heartbeat;
pub mod humanize;
pub mod process;
pub mod provider;
pub mod request;
pub mod session;
pub mod types;
pub mod validation;

pub use compact::{compact, Answer, CompactResponse};
pub use flight::{Flight, SingleFlight};
pub use heartbeat::{with_heartbeat, ProgressSink, HEARTBEAT_MESSAGE};
pub use humanize::{describe_format, humanize};
pub use process::ProcessProvider;
pub use provider::{present, DialogProvider, PREVIEW_TITLE};
pub use request::{AskParams, OptionParams, QuestionParams};
pub use session::{ClientContext, DialogSession, NotifyParams, TweakParams, DEFAULT_TITLE};
pub use types::*;
pub use validation::{is_all_of_the_above, normalize_escapes, MAX_CHOICES};
