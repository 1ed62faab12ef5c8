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

//! Error types for account management and transfers.

use crate::base::AccountId;
use thiserror::Error;

/// Account management errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// An account with the same ID already exists
    #[error("Account id {0} already exists!")]
    DuplicateAccount(AccountId),

    /// No account is stored under the requested ID
    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    /// Initial balance is below zero
    #[error("Initial balance must be positive.")]
    NegativeBalance,
}

/// Transfer errors.
///
/// Every variant is terminal for the transfer that raised it. Rejections
/// raised after the transaction began are only returned once the rollback
/// has restored the touched balances.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Amount is negative
    #[error("Transfer amount not valid. Please try with valid amount")]
    InvalidAmount,

    /// Source or destination account does not exist
    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    /// Source and destination are the same account
    #[error("Self Transfer not allowed")]
    SelfTransferNotAllowed,

    /// Debit would take the source balance below zero
    #[error("Insufficient balance in account")]
    InsufficientBalance,
}

/// Notification delivery errors.
///
/// Never surfaced to transfer callers; the transfer has already committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
