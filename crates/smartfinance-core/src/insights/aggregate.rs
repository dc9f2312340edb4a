//! Category aggregation

use crate::models::{CategoryAggregate, Transaction};

/// Sum absolute amounts per category, in first-seen order
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryAggregate> {
    let mut breakdown: Vec<CategoryAggregate> = Vec::new();

    for tx in transactions {
        // Linear scan keeps first-seen order; category counts are small
        match breakdown.iter_mut().find(|agg| agg.name == tx.category) {
            Some(agg) => agg.value += tx.amount.abs(),
            None => breakdown.push(CategoryAggregate {
                name: tx.category.clone(),
                value: tx.amount.abs(),
            }),
        }
    }

    breakdown
}

/// Grand total of a breakdown
pub fn breakdown_total(breakdown: &[CategoryAggregate]) -> f64 {
    breakdown.iter().map(|agg| agg.value).sum()
}
