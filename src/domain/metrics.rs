//! Performance metrics and the simulated equity curve.
//!
//! Every trade is one position sized to the full current equity and closed
//! after a month. Equity starts at [`INITIAL_EQUITY`] and compounds
//! `1 + return_1m / 100` per trade in date order.

use super::backtest::Trade;
use serde::{Deserialize, Serialize};

pub const INITIAL_EQUITY: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub trade_count: usize,
    /// Percentage of trades with a positive one-month return.
    pub win_rate: f64,
    pub avg_return_1d: f64,
    pub avg_return_1w: f64,
    pub avg_return_1m: f64,
    /// Final equity minus [`INITIAL_EQUITY`].
    pub cumulative_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: String,
    pub cumulative: f64,
}

impl Metrics {
    pub fn compute(trades: &[Trade]) -> Self {
        let trade_count = trades.len();
        if trade_count == 0 {
            return Metrics {
                trade_count: 0,
                win_rate: 0.0,
                avg_return_1d: 0.0,
                avg_return_1w: 0.0,
                avg_return_1m: 0.0,
                cumulative_return: 0.0,
            };
        }

        let n = trade_count as f64;
        let wins = trades.iter().filter(|t| t.return_1m > 0.0).count();
        let mean = |field: fn(&Trade) -> f64| trades.iter().map(field).sum::<f64>() / n;

        let final_equity = compounded(trades).last().unwrap_or(INITIAL_EQUITY);

        Metrics {
            trade_count,
            win_rate: wins as f64 / n * 100.0,
            avg_return_1d: mean(|t: &Trade| t.return_1d),
            avg_return_1w: mean(|t: &Trade| t.return_1w),
            avg_return_1m: mean(|t: &Trade| t.return_1m),
            cumulative_return: final_equity - INITIAL_EQUITY,
        }
    }
}

/// Running equity after each trade.
fn compounded(trades: &[Trade]) -> impl Iterator<Item = f64> + '_ {
    trades.iter().scan(INITIAL_EQUITY, |equity, t| {
        *equity *= 1.0 + t.return_1m / 100.0;
        Some(*equity)
    })
}

/// Equity curve: an opening point at [`INITIAL_EQUITY`] dated at the first
/// trade (or empty when there are none), then one point per trade.
pub fn build_equity_curve(trades: &[Trade]) -> Vec<EquityPoint> {
    let opening = EquityPoint {
        date: trades.first().map(|t| t.date.clone()).unwrap_or_default(),
        cumulative: INITIAL_EQUITY,
    };
    std::iter::once(opening)
        .chain(
            trades
                .iter()
                .zip(compounded(trades))
                .map(|(t, cumulative)| EquityPoint {
                    date: t.date.clone(),
                    cumulative,
                }),
        )
        .collect()
}
