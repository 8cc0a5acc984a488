//! Fire-and-forget notifications for sound cues and UI refresh
//!
//! Subscribers get an mpsc receiver. Sending never blocks and never fails
//! the command that triggered it: a dropped receiver is simply pruned.

use super::{EventKind, Team};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Something the engine just did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A rally point that did not close a set
    Point { team: Team },
    /// A point that closed a set but not the match
    SetWin { team: Team, set_index: u32 },
    /// The match-deciding point
    MatchWin { team: Team },
    /// The last point was taken back
    Undo,
    /// The match was cleared (start or reset)
    Reset,
}

impl Notification {
    /// Notification for an applied point of the given kind
    pub fn for_point(team: Team, kind: EventKind, set_index: u32) -> Self {
        match kind {
            EventKind::Point => Notification::Point { team },
            EventKind::SetWin => Notification::SetWin { team, set_index },
            EventKind::MatchWin => Notification::MatchWin { team },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Notification::Point { .. } => "POINT",
            Notification::SetWin { .. } => "SET_WIN",
            Notification::MatchWin { .. } => "MATCH_WIN",
            Notification::Undo => "UNDO",
            Notification::Reset => "RESET",
        }
    }
}

/// Fan-out of notifications to any number of subscribers
#[derive(Debug, Default)]
pub struct Notifier {
    subscribers: Vec<Sender<Notification>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver to every live subscriber, dropping the ones that hung up
    pub fn emit(&mut self, notification: Notification) {
        self.subscribers.retain(|tx| tx.send(notification).is_ok());
    }

    /// Number of live subscribers (as of the last emit)
    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_all_subscribers() {
        let mut notifier = Notifier::new();
        let rx1 = notifier.subscribe();
        let rx2 = notifier.subscribe();

        notifier.emit(Notification::Undo);

        assert_eq!(rx1.try_recv(), Ok(Notification::Undo));
        assert_eq!(rx2.try_recv(), Ok(Notification::Undo));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut notifier = Notifier::new();
        let rx = notifier.subscribe();
        drop(notifier.subscribe());
        assert_eq!(notifier.subscriber_count(), 2);

        notifier.emit(Notification::Reset);

        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(rx.try_recv(), Ok(Notification::Reset));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let mut notifier = Notifier::new();
        notifier.emit(Notification::Point { team: Team::A });
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_for_point() {
        assert_eq!(
            Notification::for_point(Team::B, EventKind::Point, 0),
            Notification::Point { team: Team::B }
        );
        assert_eq!(
            Notification::for_point(Team::A, EventKind::SetWin, 1),
            Notification::SetWin {
                team: Team::A,
                set_index: 1
            }
        );
        assert_eq!(
            Notification::for_point(Team::A, EventKind::MatchWin, 2).label(),
            "MATCH_WIN"
        );
    }
}
