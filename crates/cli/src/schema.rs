use anyhow::{Context, Result, bail};
use argwalk::{Arg, ArgParser, ArgValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEMA_NAME: &str = "argwalk.json";

/// Option declarations for one program, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    #[serde(default)]
    pub args: Vec<ArgSchema>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgSchema {
    pub long: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(rename = "type", default)]
    pub value_type: ValueType,

    #[serde(default)]
    pub positional: bool,

    #[serde(default)]
    pub multi_value: bool,

    /// Minimum number of values; implies `multiValue`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<usize>,

    /// Lower bound for each value (int and float only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,

    /// A single default or, for multi-value arguments, an array of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    #[default]
    String,
    Bool,
    Flag,
    Help,
}

pub fn load_schema(path: &Path) -> Result<Schema> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema: {}", path.display()))?;
    let schema: Schema = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse schema JSON: {}", path.display()))?;
    tracing::debug!(path = %path.display(), args = schema.args.len(), "loaded schema");
    Ok(schema)
}

pub fn write_example_schema(dir: &Path) -> Result<PathBuf> {
    let dest = dir.join(DEFAULT_SCHEMA_NAME);
    if dest.exists() {
        bail!("{DEFAULT_SCHEMA_NAME} already exists in {}", dir.display());
    }

    let schema = Schema {
        program: Some("example".to_string()),
        args: vec![
            ArgSchema {
                long: "verbose".to_string(),
                short: Some('v'),
                description: "Verbose output".to_string(),
                value_type: ValueType::Flag,
                ..Default::default()
            },
            ArgSchema {
                long: "count".to_string(),
                short: Some('n'),
                description: "How many times".to_string(),
                value_type: ValueType::Int,
                min: Some(Value::from(1)),
                default: Some(Value::from(1)),
                ..Default::default()
            },
            ArgSchema {
                long: "files".to_string(),
                description: "Input files".to_string(),
                value_type: ValueType::String,
                positional: true,
                multi_value: true,
                ..Default::default()
            },
            ArgSchema {
                long: "help".to_string(),
                short: Some('h'),
                description: "Show help message".to_string(),
                value_type: ValueType::Help,
                ..Default::default()
            },
        ],
    };

    let mut out = serde_json::to_string_pretty(&schema).context("failed to serialize schema")?;
    out.push('\n');
    fs::write(&dest, out).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(dest)
}

impl Schema {
    /// Declare every entry on `parser`, in file order.
    pub fn declare(&self, parser: &mut ArgParser) -> Result<()> {
        for arg in &self.args {
            arg.declare(parser)
                .with_context(|| format!("invalid schema entry for --{}", arg.long))?;
        }
        Ok(())
    }

    pub fn get(&self, long: &str) -> Option<&ArgSchema> {
        // Later entries win, matching the parser's re-declaration rule.
        self.args.iter().rev().find(|a| a.long == long)
    }
}

impl ArgSchema {
    fn declare(&self, parser: &mut ArgParser) -> Result<()> {
        if self.long.trim().is_empty() {
            bail!("argument has an empty long name");
        }

        let (long, description) = (self.long.as_str(), self.description.as_str());
        match self.value_type {
            ValueType::Int => {
                let arg = parser.add_int(self.short, long, description);
                if let Some(min) = self.min_as(Value::as_i64)? {
                    arg.min(min);
                }
                self.configure(arg, Value::as_i64)
            }
            ValueType::Float => {
                let arg = parser.add_float(self.short, long, description);
                if let Some(min) = self.min_as(Value::as_f64)? {
                    arg.min(min);
                }
                self.configure(arg, Value::as_f64)
            }
            ValueType::String => {
                self.reject_min()?;
                let arg = parser.add_string(self.short, long, description);
                self.configure(arg, |v| v.as_str().map(str::to_string))
            }
            ValueType::Bool => {
                self.reject_min()?;
                let arg = parser.add_bool(self.short, long, description);
                self.configure(arg, Value::as_bool)
            }
            ValueType::Flag | ValueType::Help => {
                self.reject_min()?;
                if self.positional || self.multi_value || self.min_count.is_some() {
                    bail!("flags and help triggers take no values");
                }
                if self.default.is_some() {
                    bail!("flags and help triggers cannot have a default");
                }
                if self.value_type == ValueType::Flag {
                    parser.add_flag(self.short, long, description);
                } else {
                    parser.add_help(self.short, long, description);
                }
                Ok(())
            }
        }
    }

    fn configure<T: ArgValue>(
        &self,
        arg: &mut Arg<T>,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> Result<()> {
        if self.positional {
            arg.positional();
        }
        match self.min_count {
            Some(count) => {
                arg.multi_value_min(count);
            }
            None if self.multi_value => {
                arg.multi_value();
            }
            None => {}
        }

        let defaults = match &self.default {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single) => vec![single],
            None => Vec::new(),
        };
        for value in defaults {
            let value = convert(value)
                .with_context(|| format!("default {value} does not match type {:?}", self.value_type))?;
            arg.default(value);
        }
        Ok(())
    }

    fn min_as<T>(&self, convert: impl Fn(&Value) -> Option<T>) -> Result<Option<T>> {
        self.min
            .as_ref()
            .map(|min| {
                convert(min)
                    .with_context(|| format!("min {min} does not match type {:?}", self.value_type))
            })
            .transpose()
    }

    fn reject_min(&self) -> Result<()> {
        if self.min.is_some() {
            bail!("min only applies to int and float arguments");
        }
        Ok(())
    }
}
