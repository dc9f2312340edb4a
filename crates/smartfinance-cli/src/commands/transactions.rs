//! Transaction command implementations

use std::path::Path;

use anyhow::Result;
use smartfinance_core::insights::{breakdown_total, category_breakdown};
use smartfinance_core::TransactionSource;

use super::{load_store, truncate};

pub fn cmd_transactions(transactions: Option<&Path>) -> Result<()> {
    let store = load_store(transactions)?;
    let transactions = store.fetch_transactions();

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!();
    println!("📝 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = if tx.is_expense() {
            format!("\x1b[31m${:.2}\x1b[0m", tx.amount.abs()) // Red for expenses
        } else {
            format!("\x1b[32m+${:.2}\x1b[0m", tx.amount) // Green for income
        };

        println!(
            "   {} │ {:>10} │ {:<15} │ {}",
            tx.date,
            amount_str,
            truncate(&tx.category, 15),
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}

pub fn cmd_categories(transactions: Option<&Path>) -> Result<()> {
    let store = load_store(transactions)?;
    let breakdown = category_breakdown(&store.fetch_transactions());

    if breakdown.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let total = breakdown_total(&breakdown);

    println!();
    println!("📊 Category Breakdown");
    println!("   ─────────────────────────────────────────────");

    for agg in &breakdown {
        let share = if total > 0.0 {
            agg.value / total * 100.0
        } else {
            0.0
        };
        println!(
            "   {:<20} ${:>10.2}  {:>5.1}%",
            truncate(&agg.name, 20),
            agg.value,
            share
        );
    }

    println!("   ─────────────────────────────────────────────");
    println!("   {:<20} ${:>10.2}", "Total", total);

    Ok(())
}
