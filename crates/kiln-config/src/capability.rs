//! Platform capability detection.

/// Whether builds can be isolated in a chroot environment on this platform.
///
/// Decided at compile time; it seeds the chroot default before any option is
/// read and is never consulted again.
#[must_use]
pub const fn isolation_supported() -> bool {
    cfg!(unix)
}
