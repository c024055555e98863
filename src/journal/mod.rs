//! Transaction journals and the collector that reports use to select them.

mod collector;
mod core;

pub use collector::{ExtractedJournal, JournalCollector};
pub use core::{
    Journal, JournalId, NewJournal, TransactionType, create_journal, create_journal_table,
};

#[cfg(test)]
pub use core::test_utils;
