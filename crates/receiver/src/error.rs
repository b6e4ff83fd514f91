//! Receiver error types

use common::ExtraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiverError {
    /// The event payload could not be decoded into (device, granted)
    #[error("failed to extract {field} from event: {source}")]
    EventExtraction {
        field: &'static str,
        #[source]
        source: ExtraError,
    },
}

pub type Result<T> = std::result::Result<T, ReceiverError>;
