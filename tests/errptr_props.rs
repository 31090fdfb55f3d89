//! Property-based tests for the pointer/error codec using proptest.

use kmodel::errptr::{err_ptr, is_err, is_err_or_null, ptr_err, MAX_ERRNO, PTR_MAX};
use proptest::prelude::*;

proptest! {
    #[test]
    fn err_ptr_round_trips(e in -MAX_ERRNO..=-1i64) {
        let p = err_ptr(e);
        prop_assert!(is_err(p));
        prop_assert!(is_err_or_null(p));
        prop_assert_eq!(ptr_err(p), e);
    }

    #[test]
    fn valid_pointers_never_classify_as_errors(p in 1u64..=PTR_MAX) {
        prop_assert!(!is_err(p));
        prop_assert!(!is_err_or_null(p));
    }

    #[test]
    fn error_window_values_always_decode_negative(p in (PTR_MAX + 1)..=u64::MAX) {
        prop_assert!(is_err(p));
        let e = ptr_err(p);
        prop_assert!((-MAX_ERRNO..=-1).contains(&e));
        prop_assert_eq!(err_ptr(e), p);
    }

    #[test]
    fn encodings_are_disjoint(e in -MAX_ERRNO..=-1i64, p in 1u64..=PTR_MAX) {
        prop_assert_ne!(err_ptr(e), p);
    }
}
