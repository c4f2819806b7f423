//! Logging macros
//!
//! Forward to `defmt` when the `defmt` feature is enabled (firmware builds).
//! On the host they still type-check their arguments through
//! `format_args!` but emit nothing, so messages must stick to `{}` / `{:?}`
//! placeholders that both backends understand.

#![allow(unused_macros)]

macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::core::mem::drop(::core::format_args!($($arg)*));
    }};
}

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::core::mem::drop(::core::format_args!($($arg)*));
    }};
}

macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::core::mem::drop(::core::format_args!($($arg)*));
    }};
}

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::core::mem::drop(::core::format_args!($($arg)*));
    }};
}

macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::core::mem::drop(::core::format_args!($($arg)*));
    }};
}
