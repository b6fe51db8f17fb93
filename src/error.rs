use thiserror::Error;

#[derive(Debug, Error)]
pub enum UdfError {
    #[error("unexpected end of data")]
    UnexpectedEod,

    #[error("unsupported image format")]
    NotUdf,
    #[error("unknown volume structure identifier '{0}'")]
    UnknownVolumeStructure(String),
    #[error("unexpected tag identifier {0}")]
    UnexpectedTagIdentifier(u16),
    #[error("expected tag {expected} but was {actual}")]
    TagMismatch { expected: u16, actual: u16 },
    #[error("tag checksum mismatch at sector {0}")]
    TagChecksum(u32),
    #[error("unsupported partition map type {0}")]
    UnsupportedPartitionMap(u8),
    #[error("unsupported dstring compression id {0}")]
    UnsupportedCompressionId(u8),
    #[error("unsupported character encoding {0}")]
    UnsupportedCharacterEncoding(u8),
    #[error("invalid on-disk timestamp")]
    InvalidTimestamp,

    #[error("no {0} descriptor in volume descriptor sequence")]
    DescriptorNotFound(&'static str),
    #[error("more than one {0} descriptor in volume descriptor sequence")]
    DuplicateDescriptor(&'static str),
    #[error("volume descriptor sequence is not terminated")]
    UnterminatedSequence,

    #[error("'{0}' is not a directory")]
    NotADirectory(String),
    #[error("'{0}' is a directory")]
    IsADirectory(String),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}
