//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::EventTraderError;

/// Port for handing a backtest result to the presentation layer.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        algorithm_name: &str,
        output_path: &str,
    ) -> Result<(), EventTraderError>;
}
