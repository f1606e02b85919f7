//! Client-side inbox: list state, merge rules, polling, and the HTTP
//! client they run against. This is the library surface a frontend
//! embeds; the server side never touches it.
pub mod client;
pub mod poller;
pub mod state;

pub use client::{HttpMailboxClient, MailboxClient};
pub use poller::InboxPoller;
pub use state::Inbox;
