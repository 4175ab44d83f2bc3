//! Query option parsing for `search` and `count`.
//!
//! The token list after the subcommand is parsed by hand rather than by clap:
//! the flag protocol needs first-`=` splitting, typed coercion of filter
//! values, and a permissive to-integer for `--top`/`--skip` that a derive
//! parser cannot express.

use indexmap::IndexMap;
use thiserror::Error;

use crate::transport::FilterValue;

/// A malformed or incomplete flag sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("Invalid format for {flag}: expected FIELD=VALUE, got '{value}'")]
    InvalidFormat { flag: String, value: String },
    #[error("Unknown option: {0}. Run 'reso-cli help' for usage.")]
    UnknownOption(String),
}

/// Structured query options for `search` and `count`.
///
/// The six operator maps keep insertion order; a raw `--filter` expression
/// takes precedence over all of them at build time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub resource: Option<String>,
    pub eq: IndexMap<String, FilterValue>,
    pub ne: IndexMap<String, FilterValue>,
    pub gt: IndexMap<String, FilterValue>,
    pub ge: IndexMap<String, FilterValue>,
    pub lt: IndexMap<String, FilterValue>,
    pub le: IndexMap<String, FilterValue>,
    pub filter: Option<String>,
    pub select: Option<Vec<String>>,
    pub expand: Option<Vec<String>>,
    pub orderby: Option<String>,
    pub top: Option<i64>,
    pub skip: Option<i64>,
}

impl QueryOptions {
    /// Parse the flat token list into a structured options record.
    ///
    /// The first token is taken as the resource name unless it starts with
    /// `--`; whether a resource is required is each command's check. Every
    /// recognized flag consumes exactly one following token.
    pub fn parse(args: &[String]) -> Result<Self, UsageError> {
        let mut options = Self::default();
        let mut rest = args;

        if let Some(first) = rest.first() {
            if !first.starts_with("--") {
                options.resource = Some(first.clone());
                rest = &rest[1..];
            }
        }

        let mut i = 0;
        while i < rest.len() {
            let flag = rest[i].as_str();
            let value = rest.get(i + 1);

            match flag {
                "--eq" | "--ne" | "--gt" | "--ge" | "--lt" | "--le" => {
                    let value = required(flag, value)?;
                    // Split on the first '=' only; values may contain '='.
                    let (field, raw) =
                        value
                            .split_once('=')
                            .ok_or_else(|| UsageError::InvalidFormat {
                                flag: flag.to_string(),
                                value: value.clone(),
                            })?;
                    let map = match flag {
                        "--eq" => &mut options.eq,
                        "--ne" => &mut options.ne,
                        "--gt" => &mut options.gt,
                        "--ge" => &mut options.ge,
                        "--lt" => &mut options.lt,
                        _ => &mut options.le,
                    };
                    map.insert(field.to_string(), coerce(raw));
                }
                "--filter" => {
                    options.filter = Some(required(flag, value)?.clone());
                }
                "--select" => {
                    options.select = Some(split_list(required(flag, value)?));
                }
                "--expand" => {
                    options.expand = Some(split_list(required(flag, value)?));
                }
                "--orderby" => {
                    options.orderby = Some(required(flag, value)?.clone());
                }
                "--top" => {
                    options.top = Some(to_int_lossy(required(flag, value)?));
                }
                "--skip" => {
                    options.skip = Some(to_int_lossy(required(flag, value)?));
                }
                other => return Err(UsageError::UnknownOption(other.to_string())),
            }

            i += 2;
        }

        Ok(options)
    }
}

/// Coerce a raw flag value into a typed scalar.
///
/// Tried in order: unsigned integer, `digits.digits` float, boolean literal
/// (case-insensitive), else the string unchanged. Negative numbers,
/// scientific notation, and surrounding whitespace deliberately fall through
/// to the string arm; so does an all-digit token too large for i64.
pub fn coerce(token: &str) -> FilterValue {
    if is_digits(token) {
        if let Ok(n) = token.parse::<i64>() {
            return FilterValue::Int(n);
        }
        return FilterValue::Str(token.to_string());
    }

    if let Some((whole, frac)) = token.split_once('.') {
        if is_digits(whole) && is_digits(frac) {
            if let Ok(f) = token.parse::<f64>() {
                return FilterValue::Float(f);
            }
        }
    }

    if token.eq_ignore_ascii_case("true") {
        return FilterValue::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return FilterValue::Bool(false);
    }

    FilterValue::Str(token.to_string())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn required<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a String, UsageError> {
    value.ok_or_else(|| UsageError::MissingValue(flag.to_string()))
}

/// Split on ',' keeping empty segments ("" becomes [""], not []).
fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

/// Permissive to-integer: optional sign plus leading digits, anything else
/// yields 0. Never fails. The digit run stops at the first non-digit, so
/// separator characters are not recognized (`"1_0"` reads as 1).
fn to_int_lossy(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits.bytes().take_while(|b| b.is_ascii_digit()).count();
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}
