use super::Event;

/// Append-only buffer of events with a single forward read cursor.
///
/// The intended protocol is: produce during one poll pass, drain with
/// [`next`](EventQueue::next), then [`reset`](EventQueue::reset) before the
/// next poll. Pushing after a partial drain is accepted, but the cursor
/// position relative to the new elements is unspecified.
#[derive(Debug, Default)]
pub struct EventQueue {
    // Buffer and cursor are coupled: `reset` must clear both together,
    // which owning them in one struct guarantees.
    events: Vec<Event>,
    cursor: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    /// Appends an event, preserving insertion order.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Returns the next unconsumed event, or `None` once exhausted.
    pub fn next(&mut self) -> Option<&Event> {
        let event = self.events.get(self.cursor)?;
        self.cursor += 1;
        Some(event)
    }

    /// Clears all buffered events and rewinds the cursor.
    pub fn reset(&mut self) {
        self.events.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_insertion_order_then_yields_none() {
        let mut queue = EventQueue::new();
        queue.push(Event::WindowFocused);
        queue.push(Event::WindowResized {
            width: 640,
            height: 480,
        });
        queue.push(Event::WindowClosed);

        assert_eq!(queue.next(), Some(&Event::WindowFocused));
        assert_eq!(
            queue.next(),
            Some(&Event::WindowResized {
                width: 640,
                height: 480
            })
        );
        assert_eq!(queue.next(), Some(&Event::WindowClosed));
        assert_eq!(queue.next(), None);
        assert_eq!(queue.next(), None);
    }

    #[test]
    fn reset_clears_contents_and_cursor_together() {
        let mut queue = EventQueue::new();
        queue.push(Event::CursorEntered);
        queue.push(Event::CursorLeft);
        while queue.next().is_some() {}

        queue.reset();
        assert!(queue.is_empty());
        assert_eq!(queue.next(), None);

        // The queue is reusable after a reset.
        queue.push(Event::WindowRefreshed);
        assert_eq!(queue.next(), Some(&Event::WindowRefreshed));
    }

    #[test]
    fn reset_mid_drain_discards_the_unconsumed_tail() {
        let mut queue = EventQueue::new();
        queue.push(Event::WindowFocused);
        queue.push(Event::WindowDefocused);
        assert!(queue.next().is_some());

        queue.reset();
        assert_eq!(queue.next(), None);
    }

    #[test]
    fn file_drop_paths_are_owned_by_the_event() {
        let mut queue = EventQueue::new();
        queue.push(Event::FileDropped {
            paths: vec!["a.spv".into(), "b.spv".into()],
        });
        match queue.next() {
            Some(Event::FileDropped { paths }) => assert_eq!(paths.len(), 2),
            other => panic!("unexpected event: {other:?}"),
        }
        // Dropping the buffered event releases the paths with it.
        queue.reset();
        assert!(queue.is_empty());
    }
}
