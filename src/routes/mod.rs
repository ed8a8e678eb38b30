/// Router Module Index
///
/// Organizes routing into access-segregated modules so the guard applied to
/// each tier is visible at the router level rather than buried in handlers.
///
/// The three modules map directly to the site's access tiers.

/// Routes accessible to any visitor: the public portfolio pages' data, the
/// contact form, and session establishment.
pub mod public;

/// Routes behind the session guard: profile management, sign-out, uploads.
pub mod authenticated;

/// Routes behind the administrator guard: the content-management workflow.
pub mod admin;
