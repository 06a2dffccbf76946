/// Router Module Index
///
/// Organizes the application's routing into access-segregated modules so the
/// authorization boundary is visible at the router level rather than buried
/// in individual handlers.
///
/// Routes accessible to any client (anonymous, read-mostly, plus the album
/// endpoints the gallery page drives directly).
pub mod public;

/// Routes restricted to users whose token carries the 'admin' role claim.
/// The gate middleware is layered on in `create_router`.
pub mod admin;
