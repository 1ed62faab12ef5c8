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

//! # Account Ledger
//!
//! This library provides an in-memory account ledger with atomic two-party
//! transfers that stay correct under concurrent access.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Facade for account creation, lookup and transfers
//! - [`AccountStore`]: Single source of truth for balances
//! - [`TransferValidator`]: Accepts or rejects a transfer before anything changes
//! - [`TransactionCoordinator`]: Save-point based commit and rollback under one lock
//! - [`TransferService`]: Runs the validate, debit, credit, commit, notify sequence
//! - [`NotificationPort`]: Post-commit notification sink
//!
//! ## Example
//!
//! ```
//! use account_ledger_rs::{AccountId, Ledger, TransferError};
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new();
//! ledger.create_account("A", dec!(100.00)).unwrap();
//! ledger.create_account("B", dec!(0.00)).unwrap();
//!
//! let (a, b) = (AccountId::from("A"), AccountId::from("B"));
//! ledger.transfer(&a, &b, dec!(100.00)).unwrap();
//! assert_eq!(ledger.get_account(&a).unwrap().balance(), dec!(0.00));
//! assert_eq!(ledger.get_account(&b).unwrap().balance(), dec!(100.00));
//!
//! // Nothing left to send.
//! assert_eq!(
//!     ledger.transfer(&a, &b, dec!(0.01)),
//!     Err(TransferError::InsufficientBalance)
//! );
//! ```
//!
//! ## Thread Safety
//!
//! Transfers are serialized by a single exclusive lock held from the first
//! account read to commit or rollback. Balance reads outside a transfer do not
//! wait for it and always observe the last committed value.

pub mod account;
mod base;
pub mod error;
mod ledger;
pub mod notification;
mod store;
mod transaction;
mod transfer;
mod validator;

pub use account::Account;
pub use base::AccountId;
pub use error::{AccountError, NotificationError, TransferError};
pub use ledger::Ledger;
pub use notification::{LoggingNotifier, Notification, NotificationPort, QueueNotifier};
pub use store::AccountStore;
pub use transaction::{LedgerGuard, SavePoint, TransactionCoordinator, TransactionScope};
pub use transfer::{Transfer, TransferService, TransferState};
pub use validator::TransferValidator;
