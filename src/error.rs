//! Error taxonomy for discovery and assembly.
//!
//! Extractors never return these for line-level noise; they drop or
//! degrade instead. Assembly and discovery return them for structural
//! failures that make a whole event (or a whole run) untrustworthy.

/// Failure raised while fetching, decoding, or assembling tournament data.
#[derive(Debug)]
pub enum IngestError {
    /// A single GET failed: network error, non-2xx status, or timeout.
    Transport { url: String, message: String },
    /// The listing payload could not be decoded.
    Decode(String),
    /// A listing entry's date had no recognisable `M/D`.
    UnparseableDate(String),
    /// The event's results page could not be fetched.
    DetailFetchFailed {
        event_id: String,
        cause: Box<IngestError>,
    },
    /// The listing could not be fetched or decoded. Fatal to a discovery call.
    ListingUnavailable(Box<IngestError>),
}

impl IngestError {
    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        IngestError::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Short machine-friendly label, used in run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Transport { .. } => "transport",
            IngestError::Decode(_) => "decode",
            IngestError::UnparseableDate(_) => "unparseable_date",
            IngestError::DetailFetchFailed { .. } => "detail_fetch_failed",
            IngestError::ListingUnavailable(_) => "listing_unavailable",
        }
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Transport { url, message } => {
                write!(f, "request to {} failed: {}", url, message)
            }
            IngestError::Decode(e) => write!(f, "could not decode listing: {}", e),
            IngestError::UnparseableDate(raw) => write!(f, "unparseable event date: {:?}", raw),
            IngestError::DetailFetchFailed { event_id, cause } => {
                write!(f, "event {} page unavailable: {}", event_id, cause)
            }
            IngestError::ListingUnavailable(cause) => {
                write!(f, "event listing unavailable: {}", cause)
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::DetailFetchFailed { cause, .. } => Some(cause.as_ref()),
            IngestError::ListingUnavailable(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn detail_fetch_failure_exposes_cause() {
        let err = IngestError::DetailFetchFailed {
            event_id: "modern_1".to_string(),
            cause: Box::new(IngestError::transport("http://x/1", "HTTP 503")),
        };
        assert_eq!(err.kind(), "detail_fetch_failed");
        assert!(err.to_string().contains("modern_1"));
        assert!(err.source().unwrap().to_string().contains("HTTP 503"));
    }
}
