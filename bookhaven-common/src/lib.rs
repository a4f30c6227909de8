//! bookhaven-common - pure state types shared by the core and its front ends
//!
//! Nothing in here does I/O.

mod fetch_state;
mod notification_kind;
mod sort_direction;
mod theme_mode;

pub use fetch_state::{FetchState, FetchStatus};
pub use notification_kind::NotificationKind;
pub use sort_direction::SortDirection;
pub use theme_mode::ThemeMode;
