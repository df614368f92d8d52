/// One keyed counter record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Key decoded from the row's QR symbol, fixed at creation
    pub key: String,
    /// Name shown to operators, defaults to the key
    pub display_name: String,
    /// Running total; signed deltas may take it below zero
    pub value: i64,
}

impl Entry {
    /// Create an entry whose display name is its key
    pub fn new(key: impl Into<String>, value: i64) -> Self {
        let key = key.into();
        Self {
            display_name: key.clone(),
            key,
            value,
        }
    }
}
