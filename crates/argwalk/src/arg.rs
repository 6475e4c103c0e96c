//! Declared arguments and their value storage.
//!
//! [`Arg<T>`] is the typed descriptor for one option or positional slot. The
//! registry holds them behind the object-safe [`AnyArg`] trait so that specs
//! of different value types can live in one map; typed read-back goes through
//! [`AnyArg::as_any`].

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::convert::Converter;
use crate::error::{AccessError, AccessResult, ParseError, ParseResult};

/// Values a spec can hold.
pub trait ArgValue: Clone + fmt::Debug + fmt::Display + 'static {}

impl<T> ArgValue for T where T: Clone + fmt::Debug + fmt::Display + 'static {}

/// Caller-owned storage a spec mirrors its values into.
///
/// Parsing is single threaded, so a shared `RefCell` is enough.
pub type Sink<T> = Rc<RefCell<T>>;

/// How a spec reacts when its name is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Takes one (or, for multi-value specs, several) value tokens.
    Value,
    /// Presence alone stores `true`; never consumes a following token.
    Flag,
    /// Stops parsing and requests the usage banner.
    Help,
}

/// Type-erased view of a declared spec.
pub trait AnyArg {
    fn long_name(&self) -> &str;
    fn short_name(&self) -> Option<char>;
    fn description(&self) -> &str;
    fn kind(&self) -> ArgKind;

    fn is_flag(&self) -> bool {
        self.kind() == ArgKind::Flag
    }

    fn is_help(&self) -> bool {
        self.kind() == ArgKind::Help
    }

    fn is_positional(&self) -> bool;
    fn is_multi_value(&self) -> bool;

    /// Whether the current values came from `default`.
    fn is_default(&self) -> bool;

    /// Whether the spec holds a usable value (default or converted input).
    fn is_good(&self) -> bool;

    /// Number of stored values, defaults included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values supplied on the command line.
    fn explicit_count(&self) -> usize;

    /// Minimum number of values a multi-value spec must receive.
    fn min_count(&self) -> Option<usize>;

    /// Defaults rendered for help output.
    fn default_text(&self) -> Option<&str>;

    /// Stored values rendered with `Display`.
    fn display_values(&self) -> Vec<String>;

    /// Convert `raw` and store it.
    fn add_value(&mut self, raw: &str) -> ParseResult<()>;

    /// Drop values from an earlier parse and go back to the declared
    /// defaults.
    fn reset(&mut self);

    /// Forget the short alias after another spec took it over.
    fn clear_short(&mut self);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// One declared option or positional slot holding values of type `T`.
pub struct Arg<T> {
    short: Option<char>,
    long: String,
    description: String,
    kind: ArgKind,
    positional: bool,
    multi_value: bool,
    min_count: Option<usize>,
    lower_bound: Option<(T, fn(&T, &T) -> bool)>,
    defaults: Vec<T>,
    default_text: Option<String>,
    good: bool,
    explicit: usize,
    values: Vec<T>,
    converter: Converter<T>,
    scalar_sink: Option<Sink<T>>,
    vector_sinks: Vec<Sink<Vec<T>>>,
}

impl<T: ArgValue> Arg<T> {
    pub(crate) fn new(
        kind: ArgKind,
        short: Option<char>,
        long: &str,
        description: &str,
        converter: Converter<T>,
    ) -> Self {
        Self {
            short,
            long: long.to_string(),
            description: description.to_string(),
            kind,
            positional: false,
            multi_value: false,
            min_count: None,
            lower_bound: None,
            defaults: Vec::new(),
            default_text: None,
            good: false,
            explicit: 0,
            values: Vec::new(),
            converter,
            scalar_sink: None,
            vector_sinks: Vec::new(),
        }
    }

    /// Match bare tokens instead of `-`/`--` prefixed ones.
    pub fn positional(&mut self) -> &mut Self {
        self.positional = true;
        self
    }

    /// Keep consuming value tokens until the next `-` prefixed token.
    pub fn multi_value(&mut self) -> &mut Self {
        self.multi_value = true;
        self
    }

    /// Like [`Arg::multi_value`], and require at least `count` values
    /// whenever the option is supplied.
    pub fn multi_value_min(&mut self, count: usize) -> &mut Self {
        self.multi_value = true;
        self.min_count = Some(count);
        self
    }

    /// Store `value` now and treat the spec as satisfied if it never shows
    /// up on the command line. Calling it repeatedly stacks several defaults.
    pub fn default(&mut self, value: T) -> &mut Self {
        if self.explicit > 0 {
            return self;
        }
        self.default_text = Some(match self.default_text.take() {
            Some(prev) => format!("{prev}, {value}"),
            None => value.to_string(),
        });
        if let Some(sink) = &self.scalar_sink {
            *sink.borrow_mut() = value.clone();
        }
        self.defaults.push(value.clone());
        self.values.push(value);
        self.good = true;
        self
    }

    /// Mirror the latest value into `sink`.
    ///
    /// A default already set is written immediately.
    pub fn store_value(&mut self, sink: &Sink<T>) -> &mut Self {
        if let Some(last) = self.values.last() {
            *sink.borrow_mut() = last.clone();
        }
        self.scalar_sink = Some(Rc::clone(sink));
        self
    }

    /// Append every value supplied on the command line to `sink`.
    ///
    /// Defaults are not mirrored.
    pub fn store_values(&mut self, sink: &Sink<Vec<T>>) -> &mut Self {
        self.vector_sinks.push(Rc::clone(sink));
        self
    }

    pub fn value(&self, index: usize) -> AccessResult<T> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| AccessError::IndexOutOfRange {
                name: self.long.clone(),
                index,
                len: self.values.len(),
            })
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    fn store(&mut self, value: T) {
        if let Some(sink) = &self.scalar_sink {
            *sink.borrow_mut() = value.clone();
        }
        for sink in &self.vector_sinks {
            sink.borrow_mut().push(value.clone());
        }
        self.values.push(value);
    }
}

impl<T: ArgValue + PartialOrd> Arg<T> {
    /// Reject any value strictly less than `threshold`.
    pub fn min(&mut self, threshold: T) -> &mut Self {
        let below: fn(&T, &T) -> bool = |value, min| value < min;
        self.lower_bound = Some((threshold, below));
        self
    }
}

impl<T: ArgValue> AnyArg for Arg<T> {
    fn long_name(&self) -> &str {
        &self.long
    }

    fn short_name(&self) -> Option<char> {
        self.short
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> ArgKind {
        self.kind
    }

    fn is_positional(&self) -> bool {
        self.positional
    }

    fn is_multi_value(&self) -> bool {
        self.multi_value
    }

    fn is_default(&self) -> bool {
        !self.defaults.is_empty() && self.explicit == 0
    }

    fn is_good(&self) -> bool {
        self.good
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn explicit_count(&self) -> usize {
        self.explicit
    }

    fn min_count(&self) -> Option<usize> {
        self.min_count
    }

    fn default_text(&self) -> Option<&str> {
        self.default_text.as_deref()
    }

    fn display_values(&self) -> Vec<String> {
        self.values.iter().map(|v| v.to_string()).collect()
    }

    fn add_value(&mut self, raw: &str) -> ParseResult<()> {
        let value = (self.converter)(raw).map_err(|reason| ParseError::ConversionFailure {
            name: self.long.clone(),
            value: raw.to_string(),
            reason,
        })?;

        if let Some((min, below)) = &self.lower_bound {
            if below(&value, min) {
                return Err(ParseError::BelowMinimumValue {
                    name: self.long.clone(),
                    value: value.to_string(),
                    min: min.to_string(),
                });
            }
        }

        // The first explicit value replaces whatever the defaults put there.
        if self.explicit == 0 && !self.defaults.is_empty() {
            self.values.clear();
        }
        self.explicit += 1;
        self.store(value);
        self.good = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.explicit = 0;
        self.good = !self.defaults.is_empty();
        if let (Some(sink), Some(last)) = (&self.scalar_sink, self.defaults.last()) {
            *sink.borrow_mut() = last.clone();
        }
    }

    fn clear_short(&mut self) {
        self.short = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: ArgValue> fmt::Debug for Arg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("kind", &self.kind)
            .field("positional", &self.positional)
            .field("multi_value", &self.multi_value)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert;

    fn int_arg() -> Arg<i64> {
        Arg::new(ArgKind::Value, Some('n'), "number", "A number", Box::new(convert::int))
    }

    #[test]
    fn add_value_converts_and_marks_good() {
        let mut arg = int_arg();
        assert!(!arg.is_good());
        arg.add_value("12").unwrap();
        assert!(arg.is_good());
        assert_eq!(arg.value(0), Ok(12));
        assert_eq!(arg.explicit_count(), 1);
    }

    #[test]
    fn conversion_failure_is_reported_not_stored() {
        let mut arg = int_arg();
        let err = arg.add_value("twelve").unwrap_err();
        assert!(matches!(err, ParseError::ConversionFailure { ref name, .. } if name == "number"));
        assert!(arg.is_empty());
        assert!(!arg.is_good());
    }

    #[test]
    fn below_minimum_is_rejected_without_storing() {
        let mut arg = int_arg();
        arg.min(10);
        let err = arg.add_value("3").unwrap_err();
        assert_eq!(
            err,
            ParseError::BelowMinimumValue {
                name: "number".to_string(),
                value: "3".to_string(),
                min: "10".to_string(),
            }
        );
        assert!(arg.is_empty());
        arg.add_value("10").unwrap();
        assert_eq!(arg.values(), &[10]);
    }

    #[test]
    fn explicit_value_replaces_default() {
        let mut arg = int_arg();
        arg.default(5);
        assert!(arg.is_default());
        assert_eq!(arg.default_text(), Some("5"));
        assert_eq!(arg.explicit_count(), 0);

        arg.add_value("7").unwrap();
        assert!(!arg.is_default());
        assert_eq!(arg.values(), &[7]);
    }

    #[test]
    fn reset_restores_declared_defaults() {
        let mut arg = int_arg();
        arg.default(5);
        arg.add_value("7").unwrap();
        arg.add_value("8").unwrap();

        arg.reset();
        assert!(arg.is_default());
        assert!(arg.is_good());
        assert_eq!(arg.values(), &[5]);
        assert_eq!(arg.explicit_count(), 0);

        let mut required = int_arg();
        required.add_value("1").unwrap();
        required.reset();
        assert!(!required.is_good());
        assert!(required.is_empty());
    }

    #[test]
    fn value_out_of_range_is_an_error() {
        let arg = int_arg();
        assert_eq!(
            arg.value(2),
            Err(AccessError::IndexOutOfRange {
                name: "number".to_string(),
                index: 2,
                len: 0,
            })
        );
    }

    #[test]
    fn sinks_mirror_values() {
        let last: Sink<i64> = Sink::default();
        let all: Sink<Vec<i64>> = Sink::default();
        let mut arg = int_arg();
        arg.default(1).store_value(&last).store_values(&all);
        assert_eq!(*last.borrow(), 1);
        assert!(all.borrow().is_empty());

        arg.add_value("2").unwrap();
        arg.add_value("3").unwrap();
        assert_eq!(*last.borrow(), 3);
        assert_eq!(*all.borrow(), vec![2, 3]);
    }
}
