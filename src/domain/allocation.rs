//! Budget allocation: proportional split, minimum-size waterfall,
//! increment quantization.

use std::collections::HashMap;

use log::info;

use crate::domain::error::EngineError;
use crate::domain::product::{Product, ProductInfo};

/// Split `buy_amount` across the ranked `scores`, proportional to each
/// product's share of the total absolute score, then redistribute entries
/// below their venue minimum and truncate the survivors to venue
/// granularity. The ranked order of the input is preserved throughout.
pub fn allocate(
    scores: &[(Product, f64)],
    products: &[ProductInfo],
    buy_amount: f64,
) -> Result<Vec<(Product, f64)>, EngineError> {
    let constraints: HashMap<&str, &ProductInfo> = products
        .iter()
        .map(|info| (info.product.id(), info))
        .collect();

    let ratio: f64 = scores.iter().map(|(_, score)| score.abs()).sum();
    if ratio == 0.0 {
        return Err(EngineError::NoAllocation);
    }

    let mut allocs: Vec<(Product, f64)> = scores
        .iter()
        .filter(|(product, _)| constraints.contains_key(product.id()))
        .map(|(product, score)| {
            let share = (buy_amount * (score / ratio) * 100.0 / 100.0).abs();
            (product.clone(), share)
        })
        .collect();

    // Fixed point: keep scanning until a full pass removes nothing. An entry
    // below its minimum merges into the next entry in current iteration
    // order, wrapping to the first. A sole survivor is terminal even when
    // still under its minimum.
    loop {
        let mut removed = false;
        let mut i = 0;
        while i < allocs.len() {
            if allocs.len() == 1 {
                break;
            }
            let min_funds = constraints[allocs[i].0.id()].min_market_funds;
            if allocs[i].1 < min_funds {
                let next = if i + 1 >= allocs.len() { 0 } else { i + 1 };
                let amount = allocs[i].1;
                allocs[next].1 += amount;
                info!(
                    "{} too small ({:.4} < {:.4}), adding to next product {} = {:.4}",
                    allocs[i].0, amount, min_funds, allocs[next].0, allocs[next].1
                );
                allocs.remove(i);
                removed = true;
            } else {
                i += 1;
            }
        }
        if !removed {
            break;
        }
    }

    for (product, amount) in &mut allocs {
        *amount = truncate_to_increment(*amount, constraints[product.id()].quote_increment);
    }
    Ok(allocs)
}

/// Truncate `value` to the decimal precision implied by the venue's quote
/// increment: the number of leading fractional zeros plus one digit of
/// margin. Truncation never rounds up, so the result never exceeds the
/// allocated funds.
pub fn truncate_to_increment(value: f64, increment: f64) -> f64 {
    let formatted = format!("{increment:.16}");
    let fraction = formatted.split('.').nth(1).unwrap_or("");
    let zeros = fraction.len() - fraction.trim_start_matches('0').len();
    let factor = 10f64.powi(zeros as i32 + 1);
    (value * factor).trunc() / factor
}
