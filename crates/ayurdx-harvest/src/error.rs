use thiserror::Error;

/// Why a harvester produced no text for a topic.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("PDF read error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("nothing found for {0}")]
    NotFound(String),
}

impl FetchError {
    /// True for the recoverable-empty case: the source answered, but had
    /// nothing on the topic.
    pub fn is_absent(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_is_absent() {
        assert!(FetchError::NotFound("Acne".into()).is_absent());
        let status = FetchError::Status {
            url: "https://example.org".into(),
            status: 503,
        };
        assert!(!status.is_absent());
        assert_eq!(status.to_string(), "https://example.org returned status 503");
        let io = FetchError::from(std::io::Error::other("disk"));
        assert!(!io.is_absent());
    }
}
