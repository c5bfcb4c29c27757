//! Event corpus provider port trait.

use crate::domain::error::EventTraderError;
use crate::domain::event::EventRecord;

/// Supplies the read-only, fully joined event corpus for one request.
pub trait CorpusPort {
    fn load_events(&self) -> Result<Vec<EventRecord>, EventTraderError>;
}
