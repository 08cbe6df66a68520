//! cfgchain: layered configuration values.
//!
//! A library for resolving typed configuration values from command-line
//! flags, a configuration file, environment variables and defaults, in
//! that order of priority.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::time::Duration;
//! use cfgchain::{Opt, OptionSet};
//!
//! let mut timeout = Duration::ZERO;
//! let mut verbose = false;
//!
//! let env = HashMap::from([("APP_TIMEOUT".to_string(), "90s".to_string())]);
//! let mut set = OptionSet::new("app", ["-v"]).with_environment(env);
//! set.add(
//!     Opt::new(&mut timeout, "request timeout")
//!         .long_flag("timeout")
//!         .env_var("APP_TIMEOUT")
//!         .default(Duration::from_secs(30)),
//! );
//! set.add(Opt::new(&mut verbose, "verbose output").flags('v', "verbose"));
//! set.parse(None).unwrap();
//! drop(set);
//!
//! assert_eq!(timeout, Duration::from_secs(90));
//! assert!(verbose);
//! ```

pub mod config;
pub mod env;
mod error;
pub mod flags;
pub mod option;
mod set;
pub mod value;

#[cfg(test)]
mod set_tests;

pub use error::Error;
pub use option::{ConfigMap, Opt, OptionError};
pub use set::{OptionId, OptionSet};
