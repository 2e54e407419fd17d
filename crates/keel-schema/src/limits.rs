//! Centralized limits for the schema engine.

// =============================================================================
// Union reduction
// =============================================================================

/// Maximum number of branches for which union construction performs
/// pairwise subtype reduction.
///
/// Reduction intersects every pair of branches, so it is quadratic in the
/// branch count. Larger unions are still deduplicated and sorted, but
/// redundant branches are kept.
pub const MAX_REDUCIBLE_BRANCHES: usize = 512;

// =============================================================================
// Discriminants
// =============================================================================

/// A discriminant must split the branches into at least this many cases to
/// be worth compiling into a dispatch.
pub const MIN_DISCRIMINANT_CASES: usize = 2;

/// Maximum number of property keys probed when looking for a property
/// discriminant on an object union.
pub const MAX_DISCRIMINANT_KEYS: usize = 64;

// =============================================================================
// Registry
// =============================================================================

/// Default prefix for registry references in ids, JSON and conditions.
pub const DEFAULT_REGISTRY_PREFIX: &str = "$ark";
