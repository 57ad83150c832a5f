//! Client resize negotiation
//!
//! The compositor proposes sizes tagged with a serial; the client answers
//! with the serial of the last proposal its buffer reflects. Clients may
//! coalesce proposals and only acknowledge the latest one, so an ack
//! settles every older request as well.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::shared::Vec2;

/// A size proposal the client has not acknowledged yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingSizeAck {
    pub serial: u32,
    pub size: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeState {
    /// Nothing was ever requested
    None,
    /// Waiting for the client; carries the newest outstanding request
    Requested(PendingSizeAck),
    /// Every request up to `serial` has been settled
    Settled { serial: u32, size: Vec2 },
}

#[derive(Debug, Clone)]
pub struct ResizeNegotiator {
    next_serial: u32,
    pending: VecDeque<PendingSizeAck>,
    /// Last size sent to the client, acknowledged or not
    pending_reported_size: Option<Vec2>,
    /// Last size the client confirmed
    reported_size: Vec2,
    committed_serial: Option<u32>,
    max_pending: usize,
}

impl ResizeNegotiator {
    pub fn new(max_pending: usize) -> Self {
        Self {
            next_serial: 1,
            pending: VecDeque::new(),
            pending_reported_size: None,
            reported_size: Vec2::ZERO,
            committed_serial: None,
            max_pending: max_pending.max(1),
        }
    }

    /// Queue a new proposal for `target` unless it repeats the previous one.
    ///
    /// Returns the request to forward to the client.
    pub fn request(&mut self, target: Vec2, force: bool) -> Option<PendingSizeAck> {
        if !force && self.pending_reported_size == Some(target) {
            return None;
        }

        let ack = PendingSizeAck {
            serial: self.next_serial,
            size: target,
        };
        self.next_serial = self.next_serial.wrapping_add(1);
        self.pending_reported_size = Some(target);

        if self.pending.len() >= self.max_pending {
            if let Some(evicted) = self.pending.pop_front() {
                warn!(
                    "Pending size queue full ({}), dropping request serial {}",
                    self.max_pending, evicted.serial
                );
            }
        }
        self.pending.push_back(ack);

        Some(ack)
    }

    /// Change the queue cap, evicting the oldest requests that no longer fit
    pub fn set_max_pending(&mut self, max_pending: usize) {
        self.max_pending = max_pending.max(1);
        let excess = self.pending.len().saturating_sub(self.max_pending);
        for evicted in self.pending.drain(..excess) {
            warn!("Pending size queue shrunk to {}, dropping request serial {}", self.max_pending, evicted.serial);
        }
    }

    /// The client applied a size without a serial (legacy configure path)
    pub fn commit_unserialized(&mut self, size: Vec2) {
        self.pending_reported_size = Some(size);
        self.reported_size = size;
    }

    /// Handle an acknowledgement. Returns the newly committed size.
    pub fn on_ack(&mut self, serial: u32) -> Option<Vec2> {
        if let Some(committed) = self.committed_serial {
            if serial < committed {
                debug!("Ignoring stale ack {} (committed {})", serial, committed);
                return None;
            }
        }

        let matched = *self.pending.iter().rev().find(|ack| ack.serial <= serial)?;

        self.pending.retain(|ack| ack.serial > matched.serial);
        self.committed_serial = Some(matched.serial);
        self.reported_size = matched.size;

        Some(matched.size)
    }

    pub fn state(&self) -> ResizeState {
        if let Some(last) = self.pending.back() {
            return ResizeState::Requested(*last);
        }
        match self.committed_serial {
            Some(serial) => ResizeState::Settled { serial, size: self.reported_size },
            None => ResizeState::None,
        }
    }

    pub fn reported_size(&self) -> Vec2 {
        self.reported_size
    }

    pub fn pending_reported_size(&self) -> Option<Vec2> {
        self.pending_reported_size
    }

    pub fn committed_serial(&self) -> Option<u32> {
        self.committed_serial
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingSizeAck> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for ResizeNegotiator {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_ack_does_not_regress() {
        let mut negotiator = ResizeNegotiator::default();
        let first = negotiator.request(Vec2::new(800.0, 600.0), false).unwrap();
        let second = negotiator.request(Vec2::new(820.0, 600.0), false).unwrap();
        assert_eq!((first.serial, second.serial), (1, 2));

        assert_eq!(negotiator.on_ack(2), Some(Vec2::new(820.0, 600.0)));
        assert_eq!(negotiator.reported_size(), Vec2::new(820.0, 600.0));

        assert_eq!(negotiator.on_ack(1), None);
        assert_eq!(negotiator.reported_size(), Vec2::new(820.0, 600.0));
        assert_eq!(negotiator.pending_len(), 0);
    }

    #[test]
    fn test_ack_settles_older_requests() {
        let mut negotiator = ResizeNegotiator::default();
        for width in [100.0, 200.0, 300.0] {
            negotiator.request(Vec2::new(width, 100.0), false);
        }

        assert_eq!(negotiator.on_ack(2), Some(Vec2::new(200.0, 100.0)));
        let remaining: Vec<u32> = negotiator.pending().map(|ack| ack.serial).collect();
        assert_eq!(remaining, vec![3]);
        assert_eq!(negotiator.state(), ResizeState::Requested(PendingSizeAck {
            serial: 3,
            size: Vec2::new(300.0, 100.0),
        }));

        assert_eq!(negotiator.on_ack(3), Some(Vec2::new(300.0, 100.0)));
        assert_eq!(negotiator.state(), ResizeState::Settled { serial: 3, size: Vec2::new(300.0, 100.0) });
    }

    #[test]
    fn test_ack_between_serials_picks_latest_below() {
        let mut negotiator = ResizeNegotiator::default();
        negotiator.request(Vec2::new(10.0, 10.0), false);
        negotiator.request(Vec2::new(20.0, 20.0), false);

        // a serial the client invented past our newest request still settles it
        assert_eq!(negotiator.on_ack(7), Some(Vec2::new(20.0, 20.0)));
        assert_eq!(negotiator.committed_serial(), Some(2));
    }

    #[test]
    fn test_duplicate_requests_are_suppressed_unless_forced() {
        let mut negotiator = ResizeNegotiator::default();
        assert!(negotiator.request(Vec2::new(640.0, 480.0), false).is_some());
        assert!(negotiator.request(Vec2::new(640.0, 480.0), false).is_none());
        assert_eq!(negotiator.request(Vec2::new(640.0, 480.0), true).map(|a| a.serial), Some(2));
        assert_eq!(negotiator.state(), ResizeState::Requested(PendingSizeAck {
            serial: 2,
            size: Vec2::new(640.0, 480.0),
        }));
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut negotiator = ResizeNegotiator::new(2);
        for i in 0..5 {
            negotiator.request(Vec2::new(100.0 + i as f64, 100.0), false);
        }
        let serials: Vec<u32> = negotiator.pending().map(|ack| ack.serial).collect();
        assert_eq!(serials, vec![4, 5]);

        // an ack for an evicted serial has nothing left to match
        assert_eq!(negotiator.on_ack(1), None);
        assert_eq!(negotiator.state(), ResizeState::Requested(PendingSizeAck {
            serial: 5,
            size: Vec2::new(104.0, 100.0),
        }));
    }

    #[test]
    fn test_shrinking_the_cap_evicts_oldest() {
        let mut negotiator = ResizeNegotiator::new(8);
        for i in 0..4 {
            negotiator.request(Vec2::new(100.0 + i as f64, 100.0), false);
        }
        negotiator.set_max_pending(1);
        let serials: Vec<u32> = negotiator.pending().map(|ack| ack.serial).collect();
        assert_eq!(serials, vec![4]);

        negotiator.set_max_pending(0);
        assert_eq!(negotiator.pending_len(), 1);
    }

    #[test]
    fn test_unknown_ack_before_any_request() {
        let mut negotiator = ResizeNegotiator::default();
        assert_eq!(negotiator.on_ack(1), None);
        assert_eq!(negotiator.state(), ResizeState::None);
    }
}
