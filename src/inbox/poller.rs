//! Async driver for the inbox list.
//!
//! One mailbox and direction is active at a time. Selecting it fetches
//! the head page immediately and starts a fixed-interval poll; scroll
//! position feeds cursor pagination; deletes go to the server first
//! and then update the held list. Fetches are serialized through a
//! single gate and a response that lands after the selection changed
//! is discarded instead of merged.
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use super::client::MailboxClient;
use super::state::Inbox;
use crate::api::public::messages::{Direction, Message};

/// Minimum spacing between two scroll position checks.
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(200);

/// Load more once the remaining scrollable distance drops below this
/// many viewport heights.
const LOAD_MORE_THRESHOLD: f64 = 1.5;

const IDLE: u8 = 0;
const REFRESHING: u8 = 1;
const LOADING_MORE: u8 = 2;

/// Single-slot gate serializing fetches. Entering while another fetch
/// is in flight fails rather than queueing behind it.
struct FetchGate(AtomicU8);

impl FetchGate {
    fn new() -> Self {
        Self(AtomicU8::new(IDLE))
    }

    fn try_enter(&self, slot: u8) -> Option<FetchGuard<'_>> {
        self.0
            .compare_exchange(IDLE, slot, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchGuard(&self.0))
    }

    fn busy(&self) -> bool {
        self.0.load(Ordering::Acquire) != IDLE
    }
}

/// Releases the gate when the fetch completes or its future is
/// dropped mid-flight.
struct FetchGuard<'a>(&'a AtomicU8);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::Release);
    }
}

/// The active mailbox and direction, stamped with the generation it
/// was installed under so late responses can be told apart from
/// current ones.
#[derive(Clone)]
struct Selection {
    mailbox_id: String,
    direction: Direction,
    generation: u64,
}

struct PollerInner<C> {
    client: C,
    inbox: Mutex<Inbox>,
    gate: FetchGate,
    generation: AtomicU64,
    selection: Mutex<Option<Selection>>,
}

impl<C: MailboxClient> PollerInner<C> {
    fn snapshot_selection(&self) -> Option<Selection> {
        self.selection.lock().unwrap().clone()
    }

    /// True while no `select` has happened since the snapshot was
    /// taken.
    fn still_current(&self, selection: &Selection) -> bool {
        self.generation.load(Ordering::Acquire) == selection.generation
    }

    async fn refresh_head(&self) -> Result<()> {
        let Some(_guard) = self.gate.try_enter(REFRESHING) else {
            return Ok(());
        };
        let Some(selection) = self.snapshot_selection() else {
            return Ok(());
        };

        let page = self
            .client
            .fetch_page(&selection.mailbox_id, selection.direction, None)
            .await?;

        if !self.still_current(&selection) {
            debug!("Discarding head page fetched for a previous selection");
            return Ok(());
        }
        self.inbox.lock().unwrap().merge_head(page);
        Ok(())
    }

    async fn load_more(&self) -> Result<()> {
        let Some(_guard) = self.gate.try_enter(LOADING_MORE) else {
            return Ok(());
        };
        let Some(selection) = self.snapshot_selection() else {
            return Ok(());
        };
        let Some(cursor) = self.inbox.lock().unwrap().next_cursor().map(String::from) else {
            return Ok(());
        };

        let page = self
            .client
            .fetch_page(&selection.mailbox_id, selection.direction, Some(&cursor))
            .await?;

        if !self.still_current(&selection) {
            debug!("Discarding older page fetched for a previous selection");
            return Ok(());
        }
        self.inbox.lock().unwrap().append_page(page);
        Ok(())
    }

    async fn delete(&self, message_id: &str) -> Result<()> {
        let Some(selection) = self.snapshot_selection() else {
            anyhow::bail!("No mailbox selected");
        };
        self.client
            .delete_message(&selection.mailbox_id, message_id)
            .await?;
        self.inbox.lock().unwrap().remove(message_id);
        Ok(())
    }
}

/// Keeps the inbox for the selected mailbox up to date.
///
/// All fetch paths funnel through one gate, so a poll tick, a manual
/// refresh, and a scroll-triggered load-more never run concurrently;
/// whichever enters first wins and the others skip. The poll timer is
/// torn down on reselect and on drop.
pub struct InboxPoller<C: MailboxClient> {
    inner: Arc<PollerInner<C>>,
    poll_interval: Duration,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    last_scroll_check: Mutex<Option<Instant>>,
}

impl<C: MailboxClient> InboxPoller<C> {
    pub fn new(client: C, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                client,
                inbox: Mutex::new(Inbox::default()),
                gate: FetchGate::new(),
                generation: AtomicU64::new(0),
                selection: Mutex::new(None),
            }),
            poll_interval,
            poll_task: Mutex::new(None),
            last_scroll_check: Mutex::new(None),
        }
    }

    /// Switch to a mailbox and direction.
    ///
    /// Stops the previous poll timer, drops every held message,
    /// fetches the new head page right away, and starts a fresh
    /// timer. A fetch still in flight for the previous selection keeps
    /// running but its response is thrown away when it lands.
    pub async fn select(&self, mailbox_id: &str, direction: Direction) -> Result<()> {
        self.stop_polling().await;

        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *self.inner.selection.lock().unwrap() = Some(Selection {
            mailbox_id: mailbox_id.to_string(),
            direction,
            generation,
        });
        self.inner.inbox.lock().unwrap().reset();

        let refreshed = self.inner.refresh_head().await;
        self.start_polling();
        refreshed
    }

    /// Fetch the head page now and merge it into the held list. Does
    /// nothing when another fetch is already in flight.
    pub async fn refresh_head(&self) -> Result<()> {
        self.inner.refresh_head().await
    }

    /// Fetch the next older page and append it. Does nothing when no
    /// cursor remains or another fetch is in flight.
    pub async fn load_more(&self) -> Result<()> {
        self.inner.load_more().await
    }

    /// Delete a message on the server, then drop it locally. The held
    /// list is untouched when the server call fails.
    pub async fn delete(&self, message_id: &str) -> Result<()> {
        self.inner.delete(message_id).await
    }

    /// React to a scroll position change, at most once per throttle
    /// window. Triggers a load-more once the remaining scrollable
    /// distance is within reach of the bottom, a cursor exists, and no
    /// fetch is in flight.
    pub async fn on_scroll(
        &self,
        scroll_top: f64,
        scroll_height: f64,
        viewport_height: f64,
    ) -> Result<()> {
        {
            let mut last = self.last_scroll_check.lock().unwrap();
            if let Some(checked_at) = *last {
                if checked_at.elapsed() < SCROLL_THROTTLE {
                    return Ok(());
                }
            }
            *last = Some(Instant::now());
        }

        if self.inner.gate.busy() {
            return Ok(());
        }
        if scroll_height - scroll_top > viewport_height * LOAD_MORE_THRESHOLD {
            return Ok(());
        }
        if self.inner.inbox.lock().unwrap().next_cursor().is_none() {
            return Ok(());
        }
        self.inner.load_more().await
    }

    /// Snapshot of the held list, newest first.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.inbox.lock().unwrap().messages().to_vec()
    }

    pub fn total(&self) -> i64 {
        self.inner.inbox.lock().unwrap().total()
    }

    pub fn next_cursor(&self) -> Option<String> {
        self.inner
            .inbox
            .lock()
            .unwrap()
            .next_cursor()
            .map(String::from)
    }

    /// Mark a message as the one being viewed. Deleting it later
    /// clears the mark.
    pub fn select_message(&self, message_id: &str) {
        self.inner.inbox.lock().unwrap().select(message_id);
    }

    pub fn clear_selected_message(&self) {
        self.inner.inbox.lock().unwrap().clear_selection();
    }

    pub fn selected_message(&self) -> Option<String> {
        self.inner.inbox.lock().unwrap().selected().map(String::from)
    }

    async fn stop_polling(&self) {
        let task = self.poll_task.lock().unwrap().take();
        if let Some(task) = task {
            task.abort();
            // Wait for the task to wind down so an in-flight poll
            // fetch releases the gate before the next selection uses
            // it.
            let _ = task.await;
        }
    }

    fn start_polling(&self) {
        let inner = Arc::clone(&self.inner);
        let interval = self.poll_interval;
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // The first tick completes immediately and `select`
            // already fetched the head page, so consume it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                // Skip the tick when a fetch is in flight; the next
                // one will catch up.
                if let Err(err) = inner.refresh_head().await {
                    warn!("Inbox poll failed: {}", err);
                }
            }
        });
        *self.poll_task.lock().unwrap() = Some(task);
    }
}

impl<C: MailboxClient> Drop for InboxPoller<C> {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.lock().unwrap().take() {
            task.abort();
        }
    }
}
