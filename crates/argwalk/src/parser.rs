use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::arg::{AnyArg, Arg, ArgKind, ArgValue, Sink};
use crate::convert;
use crate::error::{AccessError, AccessResult};
use crate::help;

/// Result of a successful [`ArgParser::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every token was consumed and validation passed.
    Parsed,
    /// The help trigger matched; remaining tokens and validation were skipped.
    Help,
}

/// Registry of declared arguments for one program.
///
/// Specs are keyed by long name and iterated in declaration order. Short
/// names are aliases onto long names.
pub struct ArgParser {
    pub(crate) program: String,
    pub(crate) args: IndexMap<String, Box<dyn AnyArg>>,
    pub(crate) aliases: HashMap<char, String>,
    pub(crate) help_requested: bool,
}

impl ArgParser {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: IndexMap::new(),
            aliases: HashMap::new(),
            help_requested: false,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Declare an argument converted by `converter`.
    ///
    /// Re-declaring a long name replaces the earlier spec in place.
    pub fn add_argument<T, F>(
        &mut self,
        short: impl Into<Option<char>>,
        long: &str,
        description: &str,
        converter: F,
    ) -> &mut Arg<T>
    where
        T: ArgValue,
        F: Fn(&str) -> Result<T, String> + 'static,
    {
        self.declare(ArgKind::Value, short.into(), long, description, Box::new(converter))
    }

    /// Declare an argument of any `FromStr` type.
    pub fn add_parsed<T>(
        &mut self,
        short: impl Into<Option<char>>,
        long: &str,
        description: &str,
    ) -> &mut Arg<T>
    where
        T: ArgValue + FromStr,
        T::Err: fmt::Display,
    {
        self.add_argument(short, long, description, convert::from_str::<T>)
    }

    pub fn add_int(
        &mut self,
        short: impl Into<Option<char>>,
        long: &str,
        description: &str,
    ) -> &mut Arg<i64> {
        self.add_argument(short, long, description, convert::int)
    }

    pub fn add_float(
        &mut self,
        short: impl Into<Option<char>>,
        long: &str,
        description: &str,
    ) -> &mut Arg<f64> {
        self.add_argument(short, long, description, convert::float)
    }

    pub fn add_string(
        &mut self,
        short: impl Into<Option<char>>,
        long: &str,
        description: &str,
    ) -> &mut Arg<String> {
        self.add_argument(short, long, description, convert::string)
    }

    pub fn add_bool(
        &mut self,
        short: impl Into<Option<char>>,
        long: &str,
        description: &str,
    ) -> &mut Arg<bool> {
        self.add_argument(short, long, description, convert::boolean)
    }

    /// Declare a presence-only switch. Unset flags read back as `false`.
    pub fn add_flag(
        &mut self,
        short: impl Into<Option<char>>,
        long: &str,
        description: &str,
    ) -> &mut Arg<bool> {
        self.declare(ArgKind::Flag, short.into(), long, description, Box::new(convert::flag))
            .default(false)
    }

    /// Declare the help trigger.
    pub fn add_help(
        &mut self,
        short: impl Into<Option<char>>,
        long: &str,
        description: &str,
    ) -> &mut Arg<bool> {
        self.declare(ArgKind::Help, short.into(), long, description, Box::new(convert::flag))
            .default(false)
    }

    fn declare<T: ArgValue>(
        &mut self,
        kind: ArgKind,
        short: Option<char>,
        long: &str,
        description: &str,
        converter: convert::Converter<T>,
    ) -> &mut Arg<T> {
        let arg = Arg::new(kind, short, long, description, converter);
        if let Some(c) = short {
            if let Some(previous) = self.aliases.insert(c, long.to_string()) {
                if previous != long {
                    if let Some(spec) = self.args.get_mut(&previous) {
                        spec.clear_short();
                    }
                    tracing::debug!(short = %c, from = %previous, to = long, "short alias moved");
                }
            }
        }
        let (index, replaced) = self.args.insert_full(long.to_string(), Box::new(arg));
        if replaced.is_some() {
            tracing::debug!(long, "argument re-declared, replacing earlier spec");
        }
        self.args[index]
            .as_any_mut()
            .downcast_mut::<Arg<T>>()
            .expect("spec was inserted with this value type")
    }

    /// Mirror every value of every declared `T` spec into `sink`.
    ///
    /// Only specs declared before the call are bound.
    pub fn store_all_values<T: ArgValue>(&mut self, sink: &Sink<Vec<T>>) -> &mut Self {
        for spec in self.args.values_mut() {
            if let Some(arg) = spec.as_any_mut().downcast_mut::<Arg<T>>() {
                arg.store_values(sink);
            }
        }
        self
    }

    /// Whether the help trigger matched during the last parse.
    pub fn help_requested(&self) -> bool {
        self.help_requested
    }

    /// Usage banner listing every declared spec.
    pub fn help(&self) -> String {
        help::render(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    pub fn spec(&self, name: &str) -> Option<&dyn AnyArg> {
        self.args.get(name).map(|spec| &**spec)
    }

    /// Declared specs in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = &dyn AnyArg> {
        self.args.values().map(|spec| &**spec)
    }

    /// Long name behind a short alias.
    pub fn resolve_short(&self, short: char) -> Option<&str> {
        self.aliases.get(&short).map(String::as_str)
    }

    pub fn arg<T: ArgValue>(&self, name: &str) -> AccessResult<&Arg<T>> {
        let spec = self
            .args
            .get(name)
            .ok_or_else(|| AccessError::UnknownArgument {
                name: name.to_string(),
            })?;
        spec.as_any()
            .downcast_ref::<Arg<T>>()
            .ok_or_else(|| AccessError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn get<T: ArgValue>(&self, name: &str, index: usize) -> AccessResult<T> {
        self.arg::<T>(name)?.value(index)
    }

    pub fn get_all<T: ArgValue>(&self, name: &str) -> AccessResult<Vec<T>> {
        Ok(self.arg::<T>(name)?.values().to_vec())
    }

    pub fn get_int(&self, name: &str, index: usize) -> AccessResult<i64> {
        self.get(name, index)
    }

    pub fn get_float(&self, name: &str, index: usize) -> AccessResult<f64> {
        self.get(name, index)
    }

    pub fn get_string(&self, name: &str, index: usize) -> AccessResult<String> {
        self.get(name, index)
    }

    pub fn get_bool(&self, name: &str, index: usize) -> AccessResult<bool> {
        self.get(name, index)
    }

    /// Flag state. Any `true` among repeated occurrences counts.
    pub fn get_flag(&self, name: &str) -> AccessResult<bool> {
        Ok(self.arg::<bool>(name)?.values().iter().any(|v| *v))
    }

    pub fn value_count(&self, name: &str) -> AccessResult<usize> {
        self.spec(name)
            .map(|spec| spec.len())
            .ok_or_else(|| AccessError::UnknownArgument {
                name: name.to_string(),
            })
    }
}

impl fmt::Debug for ArgParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgParser")
            .field("program", &self.program)
            .field("args", &self.args.keys().collect::<Vec<_>>())
            .field("help_requested", &self.help_requested)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_alias_long_names() {
        let mut p = ArgParser::new("prog");
        p.add_int('n', "number", "A number");
        p.add_string(None, "name", "A name");
        assert_eq!(p.resolve_short('n'), Some("number"));
        assert_eq!(p.resolve_short('x'), None);
        assert!(p.contains("name"));
    }

    #[test]
    fn redeclaring_a_long_name_replaces_the_spec() {
        let mut p = ArgParser::new("prog");
        p.add_int('n', "value", "first");
        p.add_string(None, "other", "");
        p.add_string('v', "value", "second");

        let names: Vec<&str> = p.specs().map(|s| s.long_name()).collect();
        assert_eq!(names, vec!["value", "other"]);
        assert_eq!(p.spec("value").map(|s| s.description()), Some("second"));
        assert_eq!(p.resolve_short('n'), Some("value"));
        assert!(p.arg::<String>("value").is_ok());
    }

    #[test]
    fn short_name_moves_to_the_latest_declaration() {
        let mut p = ArgParser::new("prog");
        p.add_flag('a', "alpha", "First");
        p.add_flag('a', "beta", "Second");

        assert_eq!(p.resolve_short('a'), Some("beta"));
        assert_eq!(p.spec("alpha").and_then(|s| s.short_name()), None);
        assert_eq!(p.spec("beta").and_then(|s| s.short_name()), Some('a'));

        let text = p.help();
        assert!(!text.contains("-a, --alpha"), "{text}");
        assert!(text.contains("--alpha"), "{text}");
        assert!(text.contains("-a, --beta"), "{text}");

        assert_eq!(p.parse(["prog", "-a"]), Ok(ParseOutcome::Parsed));
        assert_eq!(p.get_flag("alpha"), Ok(false));
        assert_eq!(p.get_flag("beta"), Ok(true));
    }

    #[test]
    fn typed_getters_report_misses() {
        let mut p = ArgParser::new("prog");
        p.add_int('n', "number", "").default(0);

        assert_eq!(p.get_int("number", 0), Ok(0));
        assert_eq!(
            p.get_string("number", 0),
            Err(AccessError::TypeMismatch {
                name: "number".to_string(),
                expected: type_name::<String>(),
            })
        );
        assert_eq!(
            p.get_int("missing", 0),
            Err(AccessError::UnknownArgument {
                name: "missing".to_string()
            })
        );
        assert!(matches!(
            p.get_int("number", 1),
            Err(AccessError::IndexOutOfRange { index: 1, len: 1, .. })
        ));
    }

    #[test]
    fn flags_read_false_until_set() {
        let mut p = ArgParser::new("prog");
        p.add_flag('v', "verbose", "");
        assert_eq!(p.get_flag("verbose"), Ok(false));
        assert_eq!(p.value_count("verbose"), Ok(1));
    }

    #[test]
    fn store_all_values_binds_matching_types_only() {
        let ints: Sink<Vec<i64>> = Sink::default();
        let mut p = ArgParser::new("prog");
        p.add_int('a', "alpha", "");
        p.add_int('b', "beta", "");
        p.add_string('c', "gamma", "");
        p.store_all_values(&ints);

        let outcome = p
            .parse(["prog", "-a", "1", "--beta", "2", "-c", "three"])
            .unwrap();
        assert_eq!(outcome, ParseOutcome::Parsed);
        assert_eq!(*ints.borrow(), vec![1, 2]);
    }
}
