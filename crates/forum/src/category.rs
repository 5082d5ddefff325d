use atrium_core::CategoryId;

/// A post grouping. Names are unique across the forum; uniqueness is
/// enforced by the executor's check-then-insert plus the store's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
}
