//! apiprobe assertion macros.
//!
//! Borrowed from the `pretty_assertions` idea but returning
//! `Result<_, Error>` instead of panicking: a failed check aborts the
//! current test by propagating an error, which lets `eyre` attach a
//! colorized backtrace. Check outcomes are logged through `tracing` so a
//! captured run shows every assertion that was evaluated.

/// Custom error type produced by the assertion macros, designed to be
/// propagated out of test functions with `?` and wrapped by
/// `eyre::Report` for reporting.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Check(String),
    #[error("{0}")]
    StrEq(String),
    #[error("{0}")]
    Eq(String),
}

/// Asserts that a boolean expression is true.
///
/// Non-panicking alternative to `assert!`: on failure the macro logs the
/// check and returns an error from the enclosing function.
///
/// ```rust,ignore
/// use apiprobe_core::check;
///
/// check!(response.is_success());
/// check!(response.status == 200, "expected 200 OK");
/// ```
#[macro_export]
macro_rules! check {
    ($cond:expr) => {
        $crate::check!(@ $cond, "", "");
    };
    ($cond:expr, $($arg:tt)+) => {
        $crate::check!(@ $cond, ": ", $($arg)+);
    };
    (@ $cond:expr, $maybe_colon:expr, $($arg:tt)*) => {
        if !$cond {
            let __message = format!(
                "check failed: {}{}{}",
                stringify!($cond),
                $maybe_colon,
                format_args!($($arg)*)
            );
            $crate::tracing::error!("{__message}");
            Err($crate::assertion::Error::Check(__message))?;
        } else {
            $crate::tracing::debug!(
                "check succeeded: {}{}{}",
                stringify!($cond),
                $maybe_colon,
                format_args!($($arg)*)
            );
        }
    };
}

/// Asserts that two expressions are equal using `==`, with a
/// `pretty_assertions` diff in the failure message.
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr$(,)?) => ({
        $crate::check_eq!(@ $left, $right, "", "");
    });
    ($left:expr, $right:expr, $($arg:tt)*) => ({
        $crate::check_eq!(@ $left, $right, ": ", $($arg)+);
    });
    (@ $left:expr, $right:expr, $maybe_colon:expr, $($arg:tt)*) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    let __message = format!("check failed: `(left == right)`{}{}\
                       \n\
                       \n{}\
                       \n",
                       $maybe_colon,
                       format_args!($($arg)*),
                       $crate::pretty_assertions::Comparison::new(left_val, right_val)
                    );
                    $crate::tracing::error!("{__message}");
                    Err($crate::assertion::Error::Eq(__message))?;
                } else {
                    $crate::tracing::debug!(
                        "check succeeded: `(left == right)`{}{}",
                        $maybe_colon,
                        format_args!($($arg)*)
                    );
                }
            }
        }
    });
}

/// Asserts that two strings are equal with a character-level diff on
/// failure. Prefer this over [`check_eq!`] for bodies and other text.
#[macro_export]
macro_rules! check_str_eq {
    ($left:expr, $right:expr$(,)?) => ({
        $crate::check_str_eq!(@ $left, $right, "", "");
    });
    ($left:expr, $right:expr, $($arg:tt)*) => ({
        $crate::check_str_eq!(@ $left, $right, ": ", $($arg)+);
    });
    (@ $left:expr, $right:expr, $maybe_colon:expr, $($arg:tt)*) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    let __message = format!("check failed: `(left == right)`{}{}\
                       \n\
                       \n{}\
                       \n",
                       $maybe_colon,
                       format_args!($($arg)*),
                       $crate::pretty_assertions::StrComparison::new(left_val, right_val)
                    );
                    $crate::tracing::error!("{__message}");
                    Err($crate::assertion::Error::StrEq(__message))?;
                } else {
                    $crate::tracing::debug!(
                        "check succeeded: `(left == right)`{}{}",
                        $maybe_colon,
                        format_args!($($arg)*)
                    );
                }
            }
        }
    });
}
