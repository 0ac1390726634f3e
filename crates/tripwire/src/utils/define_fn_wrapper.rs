// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Generates a cloneable, thread-safe wrapper around a user-provided closure.
///
/// The generated type stores the closure in an `Arc<dyn Fn ...>` and implements `Clone` and
/// `Debug`, so it can be embedded in types that derive both.
///
/// # Syntax
///
/// ```rust,ignore
/// define_fn_wrapper!(TripFn(Fn(counter: &Counter) -> bool));
/// ```
///
/// This generates a `TripFn` struct with:
/// - `new<F>(f: F) -> Self` where `F: Fn(...) -> ... + Send + Sync + 'static`
/// - `call(&self, args...) -> ReturnType`
macro_rules! define_fn_wrapper {
    ($name:ident(Fn($($param_name:ident: $param_ty:ty),*) -> $return_ty:ty)) => {
        pub(crate) struct $name(std::sync::Arc<dyn Fn($($param_ty),*) -> $return_ty + Send + Sync>);

        impl $name {
            pub(crate) fn new<F>(f: F) -> Self
            where
                F: Fn($($param_ty),*) -> $return_ty + Send + Sync + 'static,
            {
                Self(std::sync::Arc::new(f))
            }

            pub(crate) fn call(&self, $($param_name: $param_ty),*) -> $return_ty {
                (self.0)($($param_name),*)
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                Self(std::sync::Arc::clone(&self.0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name)).finish()
            }
        }
    };
}

pub(crate) use define_fn_wrapper;

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    define_fn_wrapper!(IsEven(Fn(value: u64) -> bool));

    #[test]
    fn wrapper_calls_closure() {
        let is_even = IsEven::new(|value| value % 2 == 0);

        assert!(is_even.call(4));
        assert!(!is_even.clone().call(5));
    }

    #[test]
    fn wrapper_debug_prints_type_name() {
        let is_even = IsEven::new(|_| true);

        assert_eq!(format!("{is_even:?}"), "IsEven");
    }
}
