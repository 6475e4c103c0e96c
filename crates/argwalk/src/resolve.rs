//! Token walker.
//!
//! Tokens are processed left to right, skipping the program name:
//! - `--name=value` / `--name [value...]`
//! - `-x=value` and chains like `-abc`, where value-taking options inside a
//!   chain pull their values from the following tokens and the chain scan
//!   resumes afterwards
//! - `--` alone makes every later token positional
//! - anything else feeds the current positional slot
//!
//! The first error stops the walk. A matched help trigger stops it with
//! success and skips validation.

use crate::arg::AnyArg;
use crate::error::{ParseError, ParseResult};
use crate::parser::{ArgParser, ParseOutcome};

impl ArgParser {
    /// Resolve `argv` against the declared specs. The first token is the
    /// program name and is skipped.
    ///
    /// Values from an earlier call are discarded first, so a parser can be
    /// reused.
    pub fn parse<I, S>(&mut self, argv: I) -> ParseResult<ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.help_requested = false;
        for spec in self.args.values_mut() {
            spec.reset();
        }
        let tokens: Vec<String> = argv.into_iter().map(Into::into).collect();
        let result = Walker::new(self, tokens).run();
        match &result {
            Ok(ParseOutcome::Help) => {
                self.help_requested = true;
                tracing::debug!(program = %self.program, "help requested");
            }
            Ok(ParseOutcome::Parsed) => {
                tracing::debug!(program = %self.program, "arguments parsed");
            }
            Err(err) => {
                tracing::debug!(program = %self.program, error = %err, "argument parsing failed");
            }
        }
        result
    }

    /// Parse the arguments this process was started with.
    pub fn parse_env(&mut self) -> ParseResult<ParseOutcome> {
        self.parse(std::env::args())
    }
}

enum Step {
    Continue,
    Help,
}

/// Snapshot of the spec a name resolved to.
struct Target {
    long: String,
    flag: bool,
    help: bool,
}

impl Target {
    fn of(spec: &dyn AnyArg) -> Self {
        Self {
            long: spec.long_name().to_string(),
            flag: spec.is_flag(),
            help: spec.is_help(),
        }
    }
}

struct Walker<'p> {
    parser: &'p mut ArgParser,
    tokens: Vec<String>,
    pos: usize,
    slots: Vec<String>,
    slot: usize,
    only_positionals: bool,
}

impl<'p> Walker<'p> {
    fn new(parser: &'p mut ArgParser, tokens: Vec<String>) -> Self {
        let slots = parser
            .args
            .values()
            .filter(|spec| spec.is_positional())
            .map(|spec| spec.long_name().to_string())
            .collect();
        Self {
            parser,
            tokens,
            pos: 1,
            slots,
            slot: 0,
            only_positionals: false,
        }
    }

    fn run(mut self) -> ParseResult<ParseOutcome> {
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            let step = if self.only_positionals {
                self.positional(token)?
            } else if token == "--" {
                self.only_positionals = true;
                Step::Continue
            } else if let Some(body) = token.strip_prefix("--") {
                self.long_option(body)?
            } else if let Some(body) = token.strip_prefix('-').filter(|b| !b.is_empty()) {
                self.short_option(body)?
            } else {
                self.positional(token)?
            };

            if let Step::Help = step {
                return Ok(ParseOutcome::Help);
            }
            self.pos += 1;
        }

        self.validate()?;
        Ok(ParseOutcome::Parsed)
    }

    fn long_option(&mut self, body: &str) -> ParseResult<Step> {
        if let Some((name, value)) = body.split_once('=') {
            let target = self.lookup_long(name).ok_or_else(|| ParseError::UnknownOption {
                option: format!("--{name}"),
            })?;
            return self.inline(target, value);
        }

        let target = self.lookup_long(body).ok_or_else(|| ParseError::UnknownOption {
            option: format!("--{body}"),
        })?;
        self.dispatch(target, || format!("--{body}"))
    }

    fn short_option(&mut self, body: &str) -> ParseResult<Step> {
        if let Some((name, value)) = body.split_once('=') {
            let mut chars = name.chars();
            let target = match (chars.next(), chars.next()) {
                (Some(c), None) => self.lookup_short(c),
                _ => None,
            };
            let target = target.ok_or_else(|| ParseError::UnknownOption {
                option: format!("-{name}"),
            })?;
            return self.inline(target, value);
        }

        for c in body.chars() {
            let target = self.lookup_short(c).ok_or_else(|| ParseError::UnknownOption {
                option: format!("-{c}"),
            })?;
            if let Step::Help = self.dispatch(target, || format!("-{c}"))? {
                return Ok(Step::Help);
            }
        }
        Ok(Step::Continue)
    }

    /// `name=value` form: the literal value goes straight to the spec.
    fn inline(&mut self, target: Target, value: &str) -> ParseResult<Step> {
        if target.help {
            return Ok(Step::Help);
        }
        self.add(&target.long, value)?;
        Ok(Step::Continue)
    }

    fn dispatch(&mut self, target: Target, option: impl FnOnce() -> String) -> ParseResult<Step> {
        if target.flag {
            self.add(&target.long, "true")?;
            return Ok(Step::Continue);
        }
        if target.help {
            return Ok(Step::Help);
        }
        match self.next_value() {
            Some(value) => {
                self.consume(&target.long, value)?;
                Ok(Step::Continue)
            }
            None => Err(ParseError::MissingValue { option: option() }),
        }
    }

    fn positional(&mut self, token: String) -> ParseResult<Step> {
        let Some(long) = self.slots.get(self.slot).cloned() else {
            return Err(ParseError::UnexpectedPositional { value: token });
        };

        let multi_value = self.is_multi_value(&long);
        if self.only_positionals {
            self.add(&long, &token)?;
        } else {
            self.consume(&long, token)?;
        }

        // The last slot keeps absorbing extra tokens.
        if !multi_value && self.slot + 1 < self.slots.len() {
            self.slot += 1;
        }
        Ok(Step::Continue)
    }

    /// Store `first`, then keep pulling value tokens for multi-value specs.
    fn consume(&mut self, long: &str, first: String) -> ParseResult<()> {
        self.add(long, &first)?;
        if self.is_multi_value(long) {
            while let Some(value) = self.next_value() {
                self.add(long, &value)?;
            }
        }
        Ok(())
    }

    fn add(&mut self, long: &str, raw: &str) -> ParseResult<()> {
        let spec = self
            .parser
            .args
            .get_mut(long)
            .ok_or_else(|| ParseError::UnknownOption {
                option: format!("--{long}"),
            })?;
        spec.add_value(raw)?;
        tracing::trace!(argument = long, value = raw, "stored value");
        Ok(())
    }

    /// The next token, if it exists and does not look like an option.
    fn next_value(&mut self) -> Option<String> {
        let next = self.tokens.get(self.pos + 1)?;
        if next.starts_with('-') {
            return None;
        }
        self.pos += 1;
        Some(next.clone())
    }

    fn is_multi_value(&self, long: &str) -> bool {
        self.parser
            .args
            .get(long)
            .is_some_and(|spec| spec.is_multi_value())
    }

    fn lookup_long(&self, name: &str) -> Option<Target> {
        self.parser.args.get(name).map(|spec| Target::of(&**spec))
    }

    fn lookup_short(&self, short: char) -> Option<Target> {
        let long = self.parser.aliases.get(&short)?;
        self.lookup_long(long)
    }

    fn validate(&self) -> ParseResult<()> {
        for spec in self.parser.args.values() {
            if spec.is_help() || spec.is_flag() {
                continue;
            }
            if !spec.is_good() {
                return Err(ParseError::MissingRequiredArgument {
                    name: spec.long_name().to_string(),
                });
            }
            if let Some(expected) = spec.min_count() {
                let found = spec.explicit_count();
                if found > 0 && found < expected {
                    return Err(ParseError::TooFewValues {
                        name: spec.long_name().to_string(),
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}
