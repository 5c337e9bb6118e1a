//! Typed argument schemas and the compiler that turns them into commands.
//!
//! This crate is the engine behind schema-driven command launchers:
//!
//! - [`Schema`] — an executable plus an ordered list of typed
//!   [`Parameter`]s, loaded from a JSON or YAML document with [`load_path`]
//!   or [`load_str`].
//! - [`ArgumentCompiler`] — validates runtime [`ArgValue`]s against each
//!   parameter's [`KindSpec`] and appends rendered tokens to an invocation,
//!   which [`ArgumentCompiler::render`] joins into a command string.
//! - [`format`] — the printf-style formatter used to render tokens.
//!
//! Collecting values, running the command and showing its output are left
//! to the caller.
//!
//! # Example
//!
//! ```
//! use command_args_core::*;
//!
//! let document = r#"{
//!     "exec": "g++",
//!     "args": {
//!         "source": {"type": "fmtstr", "format": "%s"},
//!         "opt": {"type": "str", "value": "-O2"},
//!         "std": {"type": "choose", "options": ["c++11", "c++17"],
//!                 "default": "c++11", "format": "-std=%s"}
//!     }
//! }"#;
//!
//! let outcome = load_str(document, SchemaFormat::Json).unwrap();
//! let mut compiler = ArgumentCompiler::new(outcome.schema);
//!
//! compiler.add_parameter("source", Some(&"main.cpp".into())).unwrap();
//! compiler.add_parameter("opt", None).unwrap();
//! compiler.add_choice("std", &"c++99".into()).unwrap();
//!
//! assert_eq!(compiler.render(), "g++ main.cpp -O2 -std=c++11");
//! assert!(matches!(compiler.events()[0], CompileEvent::ChoiceSubstituted { .. }));
//! ```

mod compiler;
mod error;
pub mod format;
mod loader;
mod types;
mod value;

pub use compiler::{ArgumentCompiler, Bound, CompileEvent};
pub use error::{CompileError, FormatError, LoadError, LoadResult, Result};
pub use loader::{LoadOutcome, LoadWarning, SchemaFormat, load_path, load_str};
pub use types::*;
pub use value::ArgValue;
