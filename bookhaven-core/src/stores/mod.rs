//! State stores
//!
//! Each store owns one slice of state. Front ends read from them and send
//! intents through their methods; they never edit the data directly. Only
//! the collection and the theme preference are persisted.

pub mod book_detail;
pub mod book_list;
pub mod collection;
pub mod notification;
pub mod theme;

pub use book_detail::*;
pub use book_list::*;
pub use collection::*;
pub use notification::*;
pub use theme::*;
