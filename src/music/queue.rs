use super::TrackMetadata;
use std::collections::VecDeque;

/// Pending tracks in playback order, plus the autoqueue switch.
#[derive(Debug, Default)]
pub struct MusicQueue {
    tracks: VecDeque<TrackMetadata>,
    autoqueue: bool,
}

impl MusicQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, track: TrackMetadata) {
        self.tracks.push_back(track);
    }

    pub fn front(&self) -> Option<&TrackMetadata> {
        self.tracks.front()
    }

    /// Removes and returns the head of the queue.
    pub fn advance(&mut self) -> Option<TrackMetadata> {
        self.tracks.pop_front()
    }

    /// Returns how many tracks were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.tracks.len();
        self.tracks.clear();
        dropped
    }

    /// Flips autoqueue and returns the new state.
    pub fn toggle_autoqueue(&mut self) -> bool {
        self.autoqueue = !self.autoqueue;
        self.autoqueue
    }

    pub fn autoqueue(&self) -> bool {
        self.autoqueue
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackMetadata> {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str) -> TrackMetadata {
        TrackMetadata::new(title, format!("https://audio.example/{title}"))
    }

    #[test]
    fn advance_is_fifo() {
        let mut queue = MusicQueue::new();
        queue.enqueue(track("A"));
        queue.enqueue(track("B"));

        assert_eq!(queue.advance().map(|t| t.title), Some("A".to_string()));
        assert_eq!(queue.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(queue.advance().map(|t| t.title), Some("B".to_string()));
        assert!(queue.is_empty());
        assert!(queue.advance().is_none());
    }

    #[test]
    fn enqueue_n_then_advance_n_empties_queue() {
        let mut queue = MusicQueue::new();
        for i in 0..5 {
            queue.enqueue(track(&format!("t{i}")));
        }
        for _ in 0..5 {
            assert!(queue.advance().is_some());
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let mut queue = MusicQueue::new();
        queue.enqueue(track("A"));
        queue.enqueue(track("A"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn clear_reports_dropped_tracks() {
        let mut queue = MusicQueue::new();
        assert_eq!(queue.clear(), 0);
        queue.enqueue(track("A"));
        queue.enqueue(track("B"));
        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn toggling_autoqueue_twice_restores_state() {
        let mut queue = MusicQueue::new();
        let initial = queue.autoqueue();
        assert_eq!(queue.toggle_autoqueue(), !initial);
        assert_eq!(queue.toggle_autoqueue(), initial);
        assert_eq!(queue.autoqueue(), initial);
    }
}
