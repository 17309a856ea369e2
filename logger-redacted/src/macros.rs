// Logging macros for the `security` target
#[macro_export]
macro_rules! security_warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!(target: "security", $($arg)*)
    };
}

#[macro_export]
macro_rules! security_error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!(target: "security", $($arg)*)
    };
}
