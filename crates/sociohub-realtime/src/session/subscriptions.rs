use std::collections::HashSet;

/// Fixed set of inbound events the session listens for.
///
/// Attaching is idempotent, so a reconnect never doubles a handler; detaching
/// removes everything, so frames from a torn-down connection go nowhere.
#[derive(Debug, Clone)]
pub struct SubscriptionSet {
    events: Vec<&'static str>,
    attached: HashSet<&'static str>,
}

impl SubscriptionSet {
    pub fn new(events: impl IntoIterator<Item = &'static str>) -> Self {
        let mut events: Vec<&'static str> = events.into_iter().collect();
        events.sort_unstable();
        events.dedup();
        Self {
            events,
            attached: HashSet::new(),
        }
    }

    pub fn events(&self) -> &[&'static str] {
        &self.events
    }

    /// Returns how many events were newly attached.
    pub fn attach(&mut self) -> usize {
        let mut n = 0;
        for ev in &self.events {
            if self.attached.insert(*ev) {
                n += 1;
            }
        }
        n
    }

    /// Returns how many events were detached.
    pub fn detach(&mut self) -> usize {
        let n = self.attached.len();
        self.attached.clear();
        n
    }

    pub fn is_attached(&self, event: &str) -> bool {
        self.attached.contains(event)
    }

    pub fn attached_len(&self) -> usize {
        self.attached.len()
    }
}
