//! ID generator port for producing unique identifiers.

/// Generates unique identifiers for tasks and members.
///
/// Ids are opaque strings; callers never parse them.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
