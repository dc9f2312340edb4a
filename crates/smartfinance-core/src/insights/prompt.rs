//! Prompt construction for savings insights
//!
//! The prompt is the `savings_insights` template with one line per
//! transaction substituted for `{{transactions}}`:
//!
//! ```text
//! 2025-08-15 - Groceries (Food): $-45.67
//! ```
//!
//! Output is a pure function of the template, the cap and the input, so
//! identical input always yields a byte-identical prompt.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::Transaction;
use crate::prompts::{Prompt, PromptId, PromptLibrary};

use super::aggregate::category_breakdown;

/// Default transaction line cap
pub const DEFAULT_MAX_LINES: usize = 200;

/// Builds provider prompts from transaction lists
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: Prompt,
    /// 0 = unlimited
    max_lines: usize,
}

impl PromptBuilder {
    pub fn new(template: Prompt) -> Self {
        Self {
            template,
            max_lines: DEFAULT_MAX_LINES,
        }
    }

    /// Load the template through the library (override first)
    pub fn from_library(library: &PromptLibrary) -> Result<Self> {
        Ok(Self::new(library.load(PromptId::SavingsInsights)?))
    }

    /// Builder using the compiled-in template
    pub fn embedded() -> Result<Self> {
        Self::from_library(&PromptLibrary::embedded_only())
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn template(&self) -> &Prompt {
        &self.template
    }

    /// Render the full prompt for these transactions
    pub fn build(&self, transactions: &[Transaction]) -> String {
        let block = self.transaction_block(transactions);
        let mut vars = HashMap::new();
        vars.insert("transactions", block.as_str());
        self.template.render_user(&vars)
    }

    fn transaction_block(&self, transactions: &[Transaction]) -> String {
        let shown = if self.max_lines == 0 {
            transactions.len()
        } else {
            transactions.len().min(self.max_lines)
        };

        let mut lines: Vec<String> = transactions[..shown]
            .iter()
            .map(format_transaction_line)
            .collect();

        if shown < transactions.len() {
            lines.push(omission_summary(transactions, transactions.len() - shown));
        }

        lines.join("\n")
    }
}

/// `date - description (category): $amount`
pub fn format_transaction_line(tx: &Transaction) -> String {
    format!(
        "{} - {} ({}): ${}",
        tx.date, tx.description, tx.category, tx.amount
    )
}

/// Totals cover the full input, not just the lines shown
fn omission_summary(transactions: &[Transaction], omitted: usize) -> String {
    let totals: Vec<String> = category_breakdown(transactions)
        .iter()
        .map(|agg| format!("{} ${:.2}", agg.name, agg.value))
        .collect();

    format!(
        "... and {} more transactions not listed. Category totals across all {} transactions: {}",
        omitted,
        transactions.len(),
        totals.join(", ")
    )
}
