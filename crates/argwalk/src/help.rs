//! Usage banner rendering.

use crate::arg::AnyArg;
use crate::parser::ArgParser;

fn format_value_name(spec: &dyn AnyArg) -> String {
    spec.long_name().to_ascii_uppercase()
}

fn format_positional(spec: &dyn AnyArg) -> String {
    let mut out = format!("<{}>", spec.long_name());
    if spec.is_multi_value() {
        out.push_str("...");
    }
    out
}

fn format_option_left(spec: &dyn AnyArg) -> String {
    let mut names: Vec<String> = Vec::new();
    if let Some(c) = spec.short_name() {
        names.push(format!("-{c}"));
    }
    names.push(format!("--{}", spec.long_name()));
    let mut out = names.join(", ");
    if !spec.is_flag() && !spec.is_help() {
        let n = format_value_name(spec);
        out.push_str(&format!(" <{n}>"));
        if spec.is_multi_value() {
            out.push_str("...");
        }
    }
    out
}

fn format_arg_help(spec: &dyn AnyArg) -> String {
    let mut out = spec.description().trim().to_string();
    if spec.is_flag() || spec.is_help() {
        return out;
    }
    let extra = match spec.default_text() {
        Some(default_value) => format!("[default: {default_value}]"),
        None => "(required)".to_string(),
    };
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(&extra);
    out
}

fn push_rows(out: &mut String, title: &str, rows: Vec<(String, String)>) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

/// Render `Usage:` plus one aligned row per declared spec.
pub(crate) fn render(parser: &ArgParser) -> String {
    let mut out = format!("Usage: {} [options]", parser.program());
    for spec in parser.specs().filter(|s| s.is_positional()) {
        out.push(' ');
        out.push_str(&format_positional(spec));
    }
    out.push('\n');

    let positionals: Vec<(String, String)> = parser
        .specs()
        .filter(|s| s.is_positional())
        .map(|s| (format_positional(s), format_arg_help(s)))
        .collect();
    push_rows(&mut out, "Arguments", positionals);

    let options: Vec<(String, String)> = parser
        .specs()
        .filter(|s| !s.is_positional())
        .map(|s| (format_option_left(s), format_arg_help(s)))
        .collect();
    push_rows(&mut out, "Options", options);

    out
}
