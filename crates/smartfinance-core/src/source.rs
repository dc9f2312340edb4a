//! Transaction sources
//!
//! The pipeline never owns transaction storage. It asks a `TransactionSource`
//! for a read-only snapshot whenever a request arrives without transactions.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Supplies the default transaction set
pub trait TransactionSource: Send + Sync {
    fn fetch_transactions(&self) -> Vec<Transaction>;
}

/// Immutable in-memory snapshot
#[derive(Debug, Clone)]
pub struct StaticTransactions {
    transactions: Arc<[Transaction]>,
}

impl StaticTransactions {
    /// Wrap a list of transactions, rejecting duplicate ids
    pub fn new(transactions: Vec<Transaction>) -> Result<Self> {
        ensure_unique_ids(&transactions)?;
        Ok(Self {
            transactions: transactions.into(),
        })
    }

    /// The built-in demo data set
    pub fn sample() -> Self {
        let tx = |id, (y, m, d), description: &str, amount, category: &str| Transaction {
            id,
            date: NaiveDate::from_ymd_opt(y, m, d).expect("valid sample date"),
            description: description.to_string(),
            amount,
            category: category.to_string(),
        };

        Self {
            transactions: vec![
                tx(1, (2025, 8, 15), "Groceries", -45.67, "Food"),
                tx(2, (2025, 8, 14), "Salary", 2500.0, "Income"),
                tx(3, (2025, 8, 13), "Netflix Subscription", -15.99, "Entertainment"),
                tx(4, (2025, 8, 12), "Electricity Bill", -60.0, "Utilities"),
            ]
            .into(),
        }
    }

    /// Load from a JSON array of transactions
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let transactions: Vec<Transaction> = serde_json::from_reader(reader)?;
        Self::new(transactions)
    }

    /// Load from CSV with an `id,date,description,amount,category` header
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let transactions = csv_reader
            .deserialize::<Transaction>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(transactions)
    }

    /// Load from a file, choosing the format by extension (`.csv` or JSON)
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        let source = if is_csv {
            Self::from_csv_reader(file)?
        } else {
            Self::from_json_reader(file)?
        };
        tracing::info!(
            path = %path.display(),
            count = source.len(),
            "Loaded transaction snapshot"
        );
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl Default for StaticTransactions {
    fn default() -> Self {
        Self::sample()
    }
}

impl TransactionSource for StaticTransactions {
    fn fetch_transactions(&self) -> Vec<Transaction> {
        self.transactions.to_vec()
    }
}

fn ensure_unique_ids(transactions: &[Transaction]) -> Result<()> {
    let mut seen = HashSet::with_capacity(transactions.len());
    for tx in transactions {
        if !seen.insert(tx.id) {
            return Err(Error::InvalidData(format!(
                "Duplicate transaction id: {}",
                tx.id
            )));
        }
    }
    Ok(())
}
