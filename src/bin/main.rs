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

use account_ledger_rs::{AccountId, Ledger};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Account Ledger - Apply transfer CSV files
///
/// Opens the accounts listed in `--accounts`, applies every transfer from the
/// input file in order, and writes the final balances to stdout.
#[derive(Parser, Debug)]
#[command(name = "account-ledger-rs")]
#[command(about = "An account ledger that applies transfer CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with opening balances
    ///
    /// Expected format: id,balance
    #[arg(long, value_name = "FILE")]
    accounts: PathBuf,

    /// Path to CSV file with transfers
    ///
    /// Expected format: from,to,amount
    /// Example: cargo run -- --accounts accounts.csv transfers.csv > balances.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    let ledger = Ledger::new();

    if let Err(e) = open(&args.accounts).and_then(|file| load_accounts(&ledger, file)) {
        eprintln!("Error loading accounts '{}': {}", args.accounts.display(), e);
        process::exit(1);
    }

    if let Err(e) = open(&args.input).and_then(|file| process_transfers(&ledger, file)) {
        eprintln!("Error processing transfers '{}': {}", args.input.display(), e);
        process::exit(1);
    }

    if let Err(e) = write_accounts(&ledger, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays a clean CSV stream.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open(path: &Path) -> Result<BufReader<File>, csv::Error> {
    Ok(BufReader::new(File::open(path)?))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " A "
        .flexible(true)
        .has_headers(true)
        .from_reader(reader)
}

/// Raw CSV record of an opening balance.
#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: String,
    balance: Decimal,
}

/// Raw CSV record matching the transfer input format.
///
/// Fields: `from, to, amount`
#[derive(Debug, Deserialize)]
struct TransferRecord {
    from: String,
    to: String,
    amount: Decimal,
}

/// Creates accounts from a CSV reader.
///
/// Malformed rows, duplicates and negative balances are skipped and logged.
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn load_accounts<R: Read>(ledger: &Ledger, reader: R) -> Result<(), csv::Error> {
    for result in csv_reader(reader).deserialize::<AccountRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed account row");
                continue;
            }
        };

        if let Err(e) = ledger.create_account(record.id, record.balance) {
            tracing::debug!(error = %e, "skipping account");
        }
    }
    Ok(())
}

/// Applies transfers from a CSV reader, one row at a time.
///
/// Rows are streamed, so arbitrarily large files never sit in memory.
/// Malformed rows and rejected transfers are skipped and logged.
///
/// # Example
///
/// ```csv
/// from,to,amount
/// A,B,100.00
/// B,C,25.50
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn process_transfers<R: Read>(ledger: &Ledger, reader: R) -> Result<(), csv::Error> {
    for (line, result) in csv_reader(reader).deserialize::<TransferRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(line, error = %e, "skipping malformed transfer row");
                continue;
            }
        };

        let from = AccountId::from(record.from);
        let to = AccountId::from(record.to);
        if let Err(e) = ledger.transfer(&from, &to, record.amount) {
            tracing::debug!(line, error = %e, "skipping transfer");
        }
    }
    Ok(())
}

/// Writes account balances to a CSV writer, sorted by ID.
///
/// # CSV Format
///
/// Columns: `id, balance`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_accounts<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for account in ledger.accounts() {
        wtr.serialize(&account)?;
    }

    wtr.flush()?;
    Ok(())
}
