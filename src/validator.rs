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

//! Transfer validation.
//!
//! Runs before any save-point exists, so a rejection here never touches the
//! store.

use crate::account::Account;
use crate::error::TransferError;
use crate::transfer::Transfer;
use rust_decimal::Decimal;

/// Decides whether a transfer may proceed, given snapshots of both accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferValidator;

impl TransferValidator {
    /// Checks a transfer against account snapshots.
    ///
    /// Checks run in a fixed order and the first failure wins:
    ///
    /// | # | Check | Error |
    /// |---|-------|-------|
    /// | 1 | amount below zero | [`TransferError::InvalidAmount`] |
    /// | 2 | source missing | [`TransferError::AccountNotFound`] |
    /// | 3 | destination missing | [`TransferError::AccountNotFound`] |
    /// | 4 | source is destination | [`TransferError::SelfTransferNotAllowed`] |
    /// | 5 | source balance below amount | [`TransferError::InsufficientBalance`] |
    pub fn validate(
        transfer: &Transfer,
        from: Option<&Account>,
        to: Option<&Account>,
    ) -> Result<(), TransferError> {
        if transfer.amount < Decimal::ZERO {
            return Err(TransferError::InvalidAmount);
        }

        let from = from.ok_or_else(|| TransferError::AccountNotFound(transfer.from.clone()))?;
        let to = to.ok_or_else(|| TransferError::AccountNotFound(transfer.to.clone()))?;

        if from.id() == to.id() {
            return Err(TransferError::SelfTransferNotAllowed);
        }

        if from.balance() - transfer.amount < Decimal::ZERO {
            return Err(TransferError::InsufficientBalance);
        }

        Ok(())
    }
}
