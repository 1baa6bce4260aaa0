//! Pending-request table and exactly-once resolution.
//!
//! Each waiting caller owns the receiving half of a `oneshot` channel; the sending
//! half lives in the pending table. Whoever removes the sender from the table
//! (resolve, cancel, or the waiter's own timeout) decides the outcome, so a request
//! is completed at most once no matter how those paths race.
//!
//! ```text
//! create_and_wait ──insert──> pending[id] = tx ──┐
//!        │                                       │ remove (first wins)
//!        └── timeout(rx) <── tx.send ── resolve / cancel / timeout
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::model::{ApprovalRequest, ApprovalResponse, ApprovalStatus};
use crate::error::{ApprovalError, Result};

/// Default number of requests kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Value delivered through a wait handle.
#[derive(Debug)]
enum Resolution {
    Decided(ApprovalResponse),
    Cancelled(String),
}

/// Insertion-ordered request history with a soft cap.
///
/// Pending entries are never evicted, so the table can exceed `limit` while more
/// than `limit` requests are outstanding.
#[derive(Debug, Default)]
struct History {
    entries: HashMap<String, ApprovalRequest>,
    order: VecDeque<String>,
    limit: usize,
}

impl History {
    fn new(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            limit,
        }
    }

    fn insert(&mut self, request: ApprovalRequest) {
        let id = request.id.clone();
        if self.entries.insert(id.clone(), request).is_some() {
            self.order.retain(|existing| existing != &id);
        }
        self.order.push_back(id);
        self.evict();
    }

    /// Eviction only runs on insert, so a request that just finished stays
    /// visible until the next one arrives.
    fn set_status(&mut self, id: &str, status: ApprovalStatus) {
        if let Some(request) = self.entries.get_mut(id) {
            request.transition(status);
        }
    }

    /// Drop the oldest resolved entries until the table fits the limit.
    fn evict(&mut self) {
        if self.limit == 0 {
            return;
        }
        let mut excess = self.entries.len().saturating_sub(self.limit);
        if excess == 0 {
            return;
        }

        let entries = &mut self.entries;
        self.order.retain(|id| {
            if excess == 0 {
                return true;
            }
            let resolved = entries
                .get(id)
                .map(|r| r.status.is_terminal())
                .unwrap_or(true);
            if resolved {
                entries.remove(id);
                excess -= 1;
                false
            } else {
                true
            }
        });
    }
}

/// Owns every in-flight approval and the history of past ones.
pub struct ApprovalCorrelator {
    /// request id -> wait handle
    pending: DashMap<String, oneshot::Sender<Resolution>>,
    /// request id -> request snapshot
    history: Mutex<History>,
}

/// Removes the pending handle if the waiting future is dropped mid-wait.
struct PendingGuard<'a> {
    correlator: &'a ApprovalCorrelator,
    request_id: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.correlator.pending.remove(&self.request_id).is_some() {
            tracing::warn!(
                request_id = %self.request_id,
                "Approval waiter dropped before a decision, discarding request"
            );
            self.correlator
                .history
                .lock()
                .set_status(&self.request_id, ApprovalStatus::Timeout);
        }
    }
}

impl ApprovalCorrelator {
    pub fn new(history_limit: usize) -> Self {
        Self {
            pending: DashMap::new(),
            history: Mutex::new(History::new(history_limit)),
        }
    }

    /// Register `request` and wait for its decision.
    ///
    /// # Errors
    /// - `DuplicateRequest` if a request with the same id is already pending
    /// - `Timeout` if nothing resolves the request within `timeout`
    /// - `Cancelled` if [`cancel`](Self::cancel) wins the race
    pub async fn create_and_wait(
        &self,
        request: ApprovalRequest,
        timeout: Duration,
    ) -> Result<ApprovalResponse> {
        let request_id = request.id.clone();
        let (tx, mut rx) = oneshot::channel::<Resolution>();

        match self.pending.entry(request_id.clone()) {
            Entry::Occupied(_) => return Err(ApprovalError::DuplicateRequest(request_id)),
            Entry::Vacant(slot) => {
                // History is written while the slot is held so a racing resolve
                // always finds the snapshot.
                self.history.lock().insert(request);
                slot.insert(tx);
            }
        }

        tracing::info!(
            request_id = %request_id,
            timeout = ?timeout,
            "Waiting for approval decision"
        );

        let _guard = PendingGuard {
            correlator: self,
            request_id: request_id.clone(),
        };

        let resolution = match tokio::time::timeout(timeout, &mut rx).await {
            Ok(received) => received,
            Err(_) => {
                if self.pending.remove(&request_id).is_some() {
                    tracing::warn!(request_id = %request_id, "Approval request timed out");
                    self.finish(&request_id, ApprovalStatus::Timeout);
                    return Err(ApprovalError::Timeout {
                        request_id,
                        timeout,
                    });
                }
                // A resolver removed the handle first; its value is already in flight.
                rx.await
            }
        };

        match resolution {
            Ok(Resolution::Decided(response)) => {
                self.finish(&request_id, ApprovalStatus::from_decision(response.approved));
                Ok(response)
            }
            Ok(Resolution::Cancelled(reason)) => {
                self.finish(&request_id, ApprovalStatus::Timeout);
                Err(ApprovalError::Cancelled { request_id, reason })
            }
            Err(_) => {
                self.finish(&request_id, ApprovalStatus::Timeout);
                Err(ApprovalError::Abandoned(request_id))
            }
        }
    }

    /// Deliver a human decision.
    ///
    /// Returns `false` if the request is not pending (unknown id, already decided,
    /// timed out or cancelled). That is a benign race, not an error.
    pub fn resolve(&self, request_id: &str, response: ApprovalResponse) -> bool {
        let Some((_, tx)) = self.pending.remove(request_id) else {
            tracing::warn!(request_id = %request_id, "No pending approval found for request");
            return false;
        };

        tracing::info!(
            request_id = %request_id,
            approved = response.approved,
            "Received approval decision"
        );
        self.finish(request_id, ApprovalStatus::from_decision(response.approved));

        if tx.send(Resolution::Decided(response)).is_err() {
            tracing::debug!(request_id = %request_id, "Approval waiter already gone");
        }
        true
    }

    /// Abort a pending request, failing its waiter with `reason`.
    pub fn cancel(&self, request_id: &str, reason: &str) -> bool {
        let Some((_, tx)) = self.pending.remove(request_id) else {
            tracing::warn!(request_id = %request_id, "No pending approval to cancel");
            return false;
        };

        tracing::info!(request_id = %request_id, reason, "Cancelling approval request");
        self.finish(request_id, ApprovalStatus::Timeout);
        if tx.send(Resolution::Cancelled(reason.to_string())).is_err() {
            tracing::debug!(request_id = %request_id, "Approval waiter already gone");
        }
        true
    }

    /// Cancel every pending request. Returns how many were cancelled.
    pub fn cancel_all(&self, reason: &str) -> usize {
        let ids: Vec<String> = self.pending.iter().map(|e| e.key().clone()).collect();
        ids.iter().filter(|id| self.cancel(id, reason)).count()
    }

    /// Snapshot of requests still awaiting a decision.
    pub fn list_pending(&self) -> Vec<ApprovalRequest> {
        let ids: Vec<String> = self.pending.iter().map(|e| e.key().clone()).collect();
        let history = self.history.lock();
        let mut pending: Vec<ApprovalRequest> = ids
            .iter()
            .filter_map(|id| history.entries.get(id).cloned())
            .collect();
        pending.sort_by_key(|r| r.timestamp);
        pending
    }

    /// Look up a request in history, pending or not.
    pub fn lookup(&self, request_id: &str) -> Option<ApprovalRequest> {
        self.history.lock().entries.get(request_id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, request_id: &str) -> bool {
        self.pending.contains_key(request_id)
    }

    fn finish(&self, request_id: &str, status: ApprovalStatus) {
        self.history.lock().set_status(request_id, status);
    }
}

impl Default for ApprovalCorrelator {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
