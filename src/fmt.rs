//! Logging front-end
//!
//! Re-exports the `defmt` macros when that feature is on, else the `log`
//! macros. With neither enabled the macros only evaluate their arguments by
//! reference.

#![allow(unused_imports, unused_macros)]

macro_rules! discard {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        let _ = ($( & $x ),*);
    }};
}

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        pub(crate) use defmt::{debug, error, info, trace, warn};
    } else if #[cfg(feature = "log")] {
        pub(crate) use log::{debug, error, info, trace, warn};
    } else {
        pub(crate) use discard as trace;
        pub(crate) use discard as debug;
        pub(crate) use discard as info;
        pub(crate) use discard as warn;
        pub(crate) use discard as error;
    }
}

#[cfg(test)]
mod tests {
    use super::{debug, error, info, trace, warn};

    #[test]
    fn macros_accept_arguments() {
        let percent = 42u8;
        trace!("trace {}", percent);
        debug!("debug {}", percent);
        info!("info {}%", percent);
        warn!("warn {}", percent);
        error!("error");
    }
}
