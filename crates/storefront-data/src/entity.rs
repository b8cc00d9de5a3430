//! The row contract persisted entities implement.

/// A persistable entity.
///
/// Every aggregate stored through [`crate::Repository`] carries a stable
/// string key, an optimistic-concurrency version, and optionally a
/// unique constraint enforced by the store at publish time.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Short lowercase name used in errors and logs (e.g. `"cart"`).
    const KIND: &'static str;

    /// Primary key. Must be stable for the lifetime of the row.
    fn key(&self) -> &str;

    /// Concurrency token. Zero for rows that were never published;
    /// incremented by the store on every successful publish.
    fn version(&self) -> u64;

    /// Called by the store when a staged change is published.
    fn set_version(&mut self, version: u64);

    /// Optional unique constraint (e.g. the owning user id for a
    /// one-per-user aggregate, or a lowercased name). Two published
    /// rows of one entity type may never share a unique key.
    fn unique_key(&self) -> Option<String> {
        None
    }
}
