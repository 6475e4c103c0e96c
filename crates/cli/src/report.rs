use anyhow::Result;
use argwalk::{ArgParser, ArgValue};
use serde_json::{Map, Value};

use crate::schema::{Schema, ValueType};

/// Parsed values keyed by long name.
///
/// Multi-value arguments are always arrays; anything else is a scalar unless
/// it was repeated.
pub fn to_json(parser: &ArgParser, schema: &Schema) -> Result<Value> {
    let mut out = Map::new();
    for spec in parser.specs() {
        if spec.is_help() {
            continue;
        }
        let name = spec.long_name();
        let value_type = schema
            .get(name)
            .map(|a| a.value_type)
            .unwrap_or_default();

        if spec.is_flag() {
            out.insert(name.to_string(), Value::Bool(parser.get_flag(name)?));
            continue;
        }

        let values = match value_type {
            ValueType::Int => json_values::<i64>(parser, name)?,
            ValueType::Float => json_values::<f64>(parser, name)?,
            ValueType::Bool => json_values::<bool>(parser, name)?,
            ValueType::String | ValueType::Flag | ValueType::Help => {
                json_values::<String>(parser, name)?
            }
        };
        let value = if !spec.is_multi_value() && values.len() == 1 {
            values.into_iter().next().unwrap_or(Value::Null)
        } else {
            Value::Array(values)
        };
        out.insert(name.to_string(), value);
    }
    Ok(Value::Object(out))
}

fn json_values<T>(parser: &ArgParser, name: &str) -> Result<Vec<Value>>
where
    T: ArgValue + Into<Value>,
{
    Ok(parser
        .get_all::<T>(name)?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// One `name = v1, v2` line per argument.
pub fn to_plain(parser: &ArgParser) -> String {
    let mut out = String::new();
    for spec in parser.specs().filter(|s| !s.is_help()) {
        out.push_str(&format!(
            "{} = {}\n",
            spec.long_name(),
            spec.display_values().join(", ")
        ));
    }
    out
}
