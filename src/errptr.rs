//! Pointer/error-code codec for fallible handle-returning APIs.
//!
//! Kernel APIs that return either a valid handle or an encoded failure use
//! one address-sized domain for both: any value above [`PTR_MAX`] is an
//! encoded negative errno, anything else is a pointer. All functions here are
//! pure; monitors call them to build and classify hook results.
//!
//! For every negative errno `e`, `ptr_err(err_ptr(e)) == e`.

/// Largest errno magnitude representable in the error window.
pub const MAX_ERRNO: i64 = 4095;

/// Ceiling of the valid-pointer range. Values strictly above it encode
/// errors.
pub const PTR_MAX: u64 = u64::MAX - MAX_ERRNO as u64;

/// The null pointer value.
pub const NULL: u64 = 0;

/// Returns true iff `ptr` encodes an error code.
#[inline]
#[must_use]
pub const fn is_err(ptr: u64) -> bool {
    ptr > PTR_MAX
}

/// Encodes a negative errno as a pointer value.
///
/// `err` must be negative and no smaller than `-MAX_ERRNO`.
#[inline]
#[must_use]
pub const fn err_ptr(err: i64) -> u64 {
    debug_assert!(err < 0 && -err <= MAX_ERRNO);
    PTR_MAX.wrapping_sub(err as u64)
}

/// Decodes an error pointer back to its negative errno.
///
/// `ptr` must satisfy [`is_err`].
#[inline]
#[must_use]
pub const fn ptr_err(ptr: u64) -> i64 {
    debug_assert!(is_err(ptr));
    PTR_MAX.wrapping_sub(ptr) as i64
}

/// Returns true iff `ptr` is null or encodes an error code.
#[inline]
#[must_use]
pub const fn is_err_or_null(ptr: u64) -> bool {
    ptr == NULL || is_err(ptr)
}

/// Errno values used by the canonical monitors.
pub mod errno {
    /// Try again.
    pub const EAGAIN: i64 = 11;
    /// Out of memory.
    pub const ENOMEM: i64 = 12;
    /// Device or resource busy.
    pub const EBUSY: i64 = 16;
    /// Invalid argument.
    pub const EINVAL: i64 = 22;
    /// Too many open files.
    pub const EMFILE: i64 = 24;
}
