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

//! Transfer orchestration.
//!
//! A transfer moves through a fixed state machine:
//!
//! ```text
//! Validating ──► Debiting ──► Crediting ──► Committing ──► Notifying ──► Done
//!     │              │            │              │
//!     └──────────────┴────────────┴──────────────┴──► RolledBack
//! ```
//!
//! Everything from `Validating` to `Committing` runs under the coordinator's
//! exclusive lock. Notifications go out after the lock is released, and a
//! failed notification never reverses a committed transfer.

use crate::account::Account;
use crate::base::AccountId;
use crate::error::TransferError;
use crate::notification::NotificationPort;
use crate::transaction::{TransactionCoordinator, TransactionScope};
use crate::validator::TransferValidator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A request to move `amount` from one account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
}

impl Transfer {
    pub fn new(from: AccountId, to: AccountId, amount: Decimal) -> Self {
        Self { from, to, amount }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.amount)
    }
}

/// Transfer lifecycle states.
///
/// Terminal states: `Done`, `RolledBack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    Validating,
    Debiting,
    Crediting,
    Committing,
    Notifying,
    Done,
    /// No balance changed and no notification was sent.
    RolledBack,
}

impl TransferState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Done | TransferState::RolledBack)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Validating => "VALIDATING",
            TransferState::Debiting => "DEBITING",
            TransferState::Crediting => "CREDITING",
            TransferState::Committing => "COMMITTING",
            TransferState::Notifying => "NOTIFYING",
            TransferState::Done => "DONE",
            TransferState::RolledBack => "ROLLED_BACK",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the state of one transfer and logs every transition.
struct Run<'t> {
    transfer: &'t Transfer,
    state: TransferState,
}

impl<'t> Run<'t> {
    fn start(transfer: &'t Transfer) -> Self {
        let run = Self {
            transfer,
            state: TransferState::Validating,
        };
        tracing::debug!(transfer = %transfer, state = %run.state, "transfer started");
        run
    }

    fn advance(&mut self, next: TransferState) {
        debug_assert!(!self.state.is_terminal(), "transition out of terminal state");
        tracing::debug!(
            transfer = %self.transfer,
            from = %self.state,
            to = %next,
            "transfer state changed"
        );
        self.state = next;
    }

    fn abort(&mut self, error: &TransferError) {
        tracing::warn!(
            transfer = %self.transfer,
            state = %self.state,
            error = %error,
            "transfer rolled back"
        );
        self.advance(TransferState::RolledBack);
    }
}

/// Validates, applies and announces transfers.
pub struct TransferService {
    coordinator: TransactionCoordinator,
    notifier: Arc<dyn NotificationPort>,
}

impl TransferService {
    pub fn new(coordinator: TransactionCoordinator, notifier: Arc<dyn NotificationPort>) -> Self {
        Self {
            coordinator,
            notifier,
        }
    }

    pub fn coordinator(&self) -> &TransactionCoordinator {
        &self.coordinator
    }

    /// Executes a transfer.
    ///
    /// # Errors
    ///
    /// - [`TransferError::InvalidAmount`] - Amount is negative.
    /// - [`TransferError::AccountNotFound`] - Source or destination is unknown.
    /// - [`TransferError::SelfTransferNotAllowed`] - Source and destination match.
    /// - [`TransferError::InsufficientBalance`] - Source cannot cover the amount.
    ///
    /// On error no balance has changed.
    pub fn transfer(&self, transfer: &Transfer) -> Result<(), TransferError> {
        let mut run = Run::start(transfer);
        let (from, to) = self.execute(&mut run)?;

        run.advance(TransferState::Notifying);
        self.notify(transfer, &from, &to);
        run.advance(TransferState::Done);

        tracing::info!(transfer = %transfer, "transfer completed");
        Ok(())
    }

    /// Runs the locked part of a transfer and returns the committed accounts.
    fn execute(&self, run: &mut Run<'_>) -> Result<(Account, Account), TransferError> {
        let transfer = run.transfer;
        let mut guard = self.coordinator.lock();

        let from = guard.snapshot(&transfer.from);
        let to = guard.snapshot(&transfer.to);
        if let Err(err) = TransferValidator::validate(transfer, from.as_ref(), to.as_ref()) {
            run.abort(&err);
            return Err(err);
        }

        let mut scope = guard.begin();
        let accounts = match apply(&mut scope, run) {
            Ok(accounts) => accounts,
            Err(err) => {
                scope.rollback();
                run.abort(&err);
                return Err(err);
            }
        };

        run.advance(TransferState::Committing);
        if let Err(err) = scope.commit() {
            run.abort(&err);
            return Err(err);
        }

        Ok(accounts)
    }

    fn notify(&self, transfer: &Transfer, from: &Account, to: &Account) {
        let notifications = [
            (
                from,
                format!(
                    "The transfer to the account with ID {} is now complete for the amount of {}.",
                    transfer.to, transfer.amount
                ),
            ),
            (
                to,
                format!(
                    "The account with ID {} has transferred {} into your account.",
                    transfer.from, transfer.amount
                ),
            ),
        ];

        for (account, message) in &notifications {
            if let Err(err) = self.notifier.notify(account, message) {
                tracing::warn!(account = %account.id(), error = %err, "notification failed");
            }
        }
    }
}

/// Debits the source and credits the destination through the scope.
///
/// The debit re-checks the balance against the working copy, so a balance
/// that changed after validation is still caught.
fn apply(
    scope: &mut TransactionScope<'_>,
    run: &mut Run<'_>,
) -> Result<(Account, Account), TransferError> {
    let transfer = run.transfer;

    run.advance(TransferState::Debiting);
    scope
        .read_for_update(&transfer.from)?
        .debit(transfer.amount)?;

    run.advance(TransferState::Crediting);
    let to = scope.read_for_update(&transfer.to)?;
    to.credit(transfer.amount)?;
    let to = to.clone();

    let from = scope.read_for_update(&transfer.from)?.clone();
    Ok((from, to))
}
