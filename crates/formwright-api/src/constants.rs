//! API versioning constants.

/// Current API version segment (e.g. "v0").
pub const API_VERSION: &str = "v0";

/// Prefix every API route is mounted under.
pub const API_PREFIX: &str = "/api/v0";

/// Where files of the local storage backend are served from.
pub const MEDIA_ROUTE: &str = "/media";

/// Upper bound on page size for list endpoints
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Multipart envelope allowance on top of the per-file limit
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Request bodies may carry this many maximum-size files
pub const BODY_LIMIT_FILE_COUNT: usize = 10;
