/// Code management routes.
pub(crate) mod codes;

/// API documentation routes.
pub(crate) mod docs;

/// Code resolution and scan tracking routes.
pub(crate) mod scan;
