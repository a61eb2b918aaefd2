/// Reasons an advertisement does not yield a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdvertError {
    /// The manufacturer data belongs to another vendor.
    #[error("manufacturer id {0:#06x} is not ours")]
    ForeignManufacturer(u16),

    /// No schema byte present.
    #[error("manufacturer data is empty")]
    Empty,

    /// The declared schema version has no known layout.
    #[error("unsupported advertisement schema {0}")]
    UnsupportedSchema(u8),

    /// Fewer bytes than the declared schema requires.
    #[error("schema {schema} advertisement truncated ({actual} bytes, need {needed})")]
    Truncated {
        schema: u8,
        needed: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, AdvertError>;
