//! Typed command-line argument parsing.
//!
//! Declare options on an [`ArgParser`], hand it the raw argv and read typed
//! values back:
//!
//! ```
//! use argwalk::{ArgParser, ParseOutcome};
//!
//! let mut parser = ArgParser::new("app");
//! parser.add_int('n', "count", "How many").default(1);
//! parser.add_flag('v', "verbose", "Verbose output");
//! parser.add_string(None, "files", "Input files").positional().multi_value();
//! parser.add_help('h', "help", "Show help message");
//!
//! let outcome = parser.parse(["app", "-v", "--count=3", "a.txt", "b.txt"]).unwrap();
//! assert_eq!(outcome, ParseOutcome::Parsed);
//! assert_eq!(parser.get_int("count", 0), Ok(3));
//! assert_eq!(parser.get_flag("verbose"), Ok(true));
//! assert_eq!(parser.value_count("files"), Ok(2));
//! ```
//!
//! Parsing is single pass and stops at the first error. Errors are returned
//! as [`ParseError`] and also emitted as `tracing` debug events.

pub mod arg;
pub mod convert;
mod error;
mod help;
mod parser;
mod resolve;

pub use arg::{AnyArg, Arg, ArgKind, ArgValue, Sink};
pub use error::{AccessError, AccessResult, ParseError, ParseResult};
pub use parser::{ArgParser, ParseOutcome};
