// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Post-commit notifications.
//!
//! The transfer service calls a [`NotificationPort`] twice after every
//! committed transfer, once per party. Delivery is fire-and-forget: errors
//! are logged by the service and otherwise ignored.

use crate::account::Account;
use crate::error::NotificationError;
use crossbeam::queue::SegQueue;

/// Delivers a message to the owner of an account.
pub trait NotificationPort: Send + Sync {
    fn notify(&self, account: &Account, message: &str) -> Result<(), NotificationError>;
}

/// Writes every notification to the log at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl NotificationPort for LoggingNotifier {
    fn notify(&self, account: &Account, message: &str) -> Result<(), NotificationError> {
        tracing::info!(
            account = %account.id(),
            "Sending notification to owner of {}: {}",
            account.id(),
            message
        );
        Ok(())
    }
}

/// A notification captured by [`QueueNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Account state right after the transfer committed.
    pub account: Account,
    pub message: String,
}

/// Collects notifications in a lock-free FIFO queue.
///
/// Producers never block each other, so concurrent transfers can notify
/// without contending on anything beyond the queue itself.
#[derive(Debug, Default)]
pub struct QueueNotifier {
    queue: SegQueue<Notification>,
}

impl QueueNotifier {
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
        }
    }

    pub fn pop(&self) -> Option<Notification> {
        self.queue.pop()
    }

    /// Removes and returns every queued notification in arrival order.
    pub fn drain(&self) -> Vec<Notification> {
        std::iter::from_fn(|| self.queue.pop()).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl NotificationPort for QueueNotifier {
    fn notify(&self, account: &Account, message: &str) -> Result<(), NotificationError> {
        self.queue.push(Notification {
            account: account.clone(),
            message: message.to_string(),
        });
        Ok(())
    }
}
