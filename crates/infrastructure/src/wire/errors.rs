use emberdns_domain::DomainError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("End of buffer at offset {0}")]
    EndOfBuffer(usize),

    #[error("Label exceeds 63 characters")]
    LabelTooLong,

    #[error("Name exceeds 255 characters")]
    NameTooLong,

    #[error("Compression jump limit exceeded")]
    TooManyJumps,

    #[error("Message shorter than the 12-byte header")]
    TruncatedHeader,

    #[error("Record data overruns its declared length")]
    RdataOverrun,

    #[error("Message has no question section")]
    MissingQuestion,
}

impl From<WireError> for DomainError {
    fn from(err: WireError) -> Self {
        DomainError::Decode(err.to_string())
    }
}
