/// Default page size for event listings
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Moderator role - can approve/reject events and see the pending queue
pub const ROLE_ADMIN: &str = "admin";

/// Global admin - implies every admin capability
pub const ROLE_SUPER_ADMIN: &str = "super_admin";
