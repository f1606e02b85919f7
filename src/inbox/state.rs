//! In-memory inbox list state and the page merge rules.
//!
//! The list is always ordered newest first. Head refreshes and backward
//! pagination mutate it through `merge_head` and `append_page` so the
//! ordering and no-duplicates invariants live in one place.
use crate::api::public::messages::{Message, MessagePage};

/// The held message list for the currently selected mailbox and
/// direction, plus the pagination cursor and server-side total.
#[derive(Debug, Default)]
pub struct Inbox {
    messages: Vec<Message>,
    next_cursor: Option<String>,
    total: i64,
    selected: Option<String>,
}

impl Inbox {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Forget everything held for the previous selection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Merge a freshly fetched head page (no cursor) into the held
    /// list.
    ///
    /// The incoming page is scanned for the first message whose id is
    /// already held. Everything before that point is genuinely new and
    /// is prepended; everything from it onward is assumed unchanged.
    /// When the page has no overlap at all the held list is stale and
    /// is replaced wholesale, which also adopts the page's cursor. A
    /// partial prepend keeps the existing cursor since the tail of the
    /// list did not move.
    ///
    /// Re-merging an identical page is a no-op: the first duplicate
    /// sits at position zero and nothing is prepended.
    pub fn merge_head(&mut self, page: MessagePage) {
        let first_duplicate = page
            .messages
            .iter()
            .position(|incoming| self.messages.iter().any(|held| held.id == incoming.id));

        match first_duplicate {
            None => {
                self.messages = page.messages;
                self.next_cursor = page.next_cursor;
                self.total = page.total;
            }
            Some(k) => {
                let mut merged: Vec<Message> = page.messages.into_iter().take(k).collect();
                merged.append(&mut self.messages);
                self.messages = merged;
                self.total = page.total;
            }
        }
    }

    /// Append an older page fetched with a cursor, adopting the page's
    /// cursor and total.
    pub fn append_page(&mut self, page: MessagePage) {
        self.messages.extend(page.messages);
        self.next_cursor = page.next_cursor;
        self.total = page.total;
    }

    /// Drop a message from the held list by id. Decrements the total
    /// and clears the selection when the removed message was selected.
    /// Returns false when the id is not held, leaving state untouched.
    pub fn remove(&mut self, message_id: &str) -> bool {
        let held = self.messages.len();
        self.messages.retain(|message| message.id != message_id);
        if self.messages.len() == held {
            return false;
        }
        self.total -= 1;
        if self.selected.as_deref() == Some(message_id) {
            self.selected = None;
        }
        true
    }

    pub fn select(&mut self, message_id: &str) {
        self.selected = Some(message_id.to_string());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::public::messages::Direction;

    fn message(id: &str, timestamp: i64) -> Message {
        Message {
            id: id.to_string(),
            direction: Direction::Received,
            from_address: Some("sender@example.com".to_string()),
            to_address: None,
            subject: format!("Message {}", id),
            content: Some("Hello".to_string()),
            html: None,
            timestamp,
        }
    }

    fn page(ids: &[(&str, i64)], next_cursor: Option<&str>, total: i64) -> MessagePage {
        MessagePage {
            messages: ids.iter().map(|(id, ts)| message(id, *ts)).collect(),
            next_cursor: next_cursor.map(String::from),
            total,
        }
    }

    fn held_ids(inbox: &Inbox) -> Vec<&str> {
        inbox.messages().iter().map(|m| m.id.as_str()).collect()
    }

    /// Tests that the first head fetch lands wholesale with its cursor
    /// and total
    #[test]
    fn it_adopts_the_first_page_wholesale() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("c", 30), ("b", 20), ("a", 10)], Some("cur-a"), 7));

        assert_eq!(held_ids(&inbox), vec!["c", "b", "a"]);
        assert_eq!(inbox.next_cursor(), Some("cur-a"));
        assert_eq!(inbox.total(), 7);
    }

    /// Tests that refreshing against an unchanged backend leaves the
    /// list identical
    #[test]
    fn it_is_idempotent_for_an_unchanged_head() {
        let mut inbox = Inbox::default();
        let head = page(&[("c", 30), ("b", 20), ("a", 10)], Some("cur-a"), 3);

        inbox.merge_head(head.clone());
        let after_first = held_ids(&inbox)
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        inbox.merge_head(head);

        assert_eq!(held_ids(&inbox), after_first);
        assert_eq!(inbox.total(), 3);
    }

    /// Tests that only messages above the first duplicate are
    /// prepended and the cursor is kept
    #[test]
    fn it_prepends_only_messages_newer_than_the_overlap() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("c", 30), ("b", 20), ("a", 10)], Some("cur-a"), 3));

        // Two new arrivals; "c" is the first duplicate in the fresh page.
        inbox.merge_head(page(&[("e", 50), ("d", 40), ("c", 30)], Some("cur-c"), 5));

        assert_eq!(held_ids(&inbox), vec!["e", "d", "c", "b", "a"]);
        assert_eq!(inbox.total(), 5);
        // Backward pagination state is still valid, so the cursor from
        // the head-only refresh is not adopted.
        assert_eq!(inbox.next_cursor(), Some("cur-a"));
    }

    /// Tests that a page with no overlap replaces the held list
    /// entirely, dropping unseen older messages
    #[test]
    fn it_replaces_the_list_when_nothing_overlaps() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("b", 20), ("a", 10)], Some("cur-a"), 2));

        // More messages arrived than one page holds; the fetched page
        // shares nothing with the held list.
        inbox.merge_head(page(&[("f", 60), ("e", 50), ("d", 40)], Some("cur-d"), 6));

        assert_eq!(held_ids(&inbox), vec!["f", "e", "d"]);
        assert_eq!(inbox.next_cursor(), Some("cur-d"));
        assert_eq!(inbox.total(), 6);
    }

    /// Tests that repeated overlapping refreshes never duplicate an id
    #[test]
    fn it_keeps_each_id_once_across_overlapping_refreshes() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("b", 20), ("a", 10)], None, 2));
        inbox.merge_head(page(&[("c", 30), ("b", 20), ("a", 10)], None, 3));
        inbox.merge_head(page(&[("d", 40), ("c", 30), ("b", 20)], None, 4));

        let ids = held_ids(&inbox);
        assert_eq!(ids, vec!["d", "c", "b", "a"]);
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }

    /// Tests that newest-first order survives a mix of head refreshes
    /// and backward pagination
    #[test]
    fn it_preserves_order_across_refresh_and_load_more() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("d", 40), ("c", 30)], Some("cur-c"), 6));
        inbox.append_page(page(&[("b", 20), ("a", 10)], None, 6));
        inbox.merge_head(page(&[("e", 50), ("d", 40)], Some("cur-d"), 7));

        assert_eq!(held_ids(&inbox), vec!["e", "d", "c", "b", "a"]);
        assert!(
            inbox
                .messages()
                .windows(2)
                .all(|pair| pair[0].timestamp >= pair[1].timestamp)
        );
        // The append consumed the cursor chain; the head-only refresh
        // left it alone.
        assert_eq!(inbox.next_cursor(), None);
    }

    /// Tests that appending an older page adopts its cursor and total
    #[test]
    fn it_appends_older_pages_at_the_tail() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("d", 40), ("c", 30)], Some("cur-c"), 4));
        inbox.append_page(page(&[("b", 20), ("a", 10)], Some("cur-a"), 4));

        assert_eq!(held_ids(&inbox), vec!["d", "c", "b", "a"]);
        assert_eq!(inbox.next_cursor(), Some("cur-a"));
        assert_eq!(inbox.total(), 4);
    }

    /// Tests that removing a message drops it, decrements the total,
    /// and clears a matching selection
    #[test]
    fn it_removes_a_message_and_clears_its_selection() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("b", 20), ("a", 10)], None, 2));
        inbox.select("b");

        assert!(inbox.remove("b"));
        assert_eq!(held_ids(&inbox), vec!["a"]);
        assert_eq!(inbox.total(), 1);
        assert_eq!(inbox.selected(), None);
    }

    /// Tests that removing one message leaves another selection alone
    #[test]
    fn it_keeps_an_unrelated_selection_on_remove() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("b", 20), ("a", 10)], None, 2));
        inbox.select("a");

        assert!(inbox.remove("b"));
        assert_eq!(inbox.selected(), Some("a"));
    }

    /// Tests that removing an unknown id changes nothing
    #[test]
    fn it_ignores_remove_for_an_unknown_id() {
        let mut inbox = Inbox::default();
        inbox.merge_head(page(&[("a", 10)], None, 1));

        assert!(!inbox.remove("zz"));
        assert_eq!(held_ids(&inbox), vec!["a"]);
        assert_eq!(inbox.total(), 1);
    }
}
