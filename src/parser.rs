// Parser for category paths used as style keys
//
// Format: `A`, `A/x`, `"run/1"/x` (quoted segments may contain `/` and `=`).
// Assignments append `=value`: `A/x=red`.

use crate::error::{BarplotError, BarplotResult};
use nom::{
    branch::alt,
    bytes::complete::is_not,
    character::complete::char,
    combinator::{all_consuming, map, opt, rest},
    multi::separated_list1,
    sequence::{delimited, separated_pair},
    IResult,
};

/// Parse one path segment, quoted or bare
fn segment(input: &str) -> IResult<&str, String> {
    alt((
        map(
            delimited(char('"'), opt(is_not("\"")), char('"')),
            |s: Option<&str>| s.unwrap_or("").to_string(),
        ),
        map(is_not("/=\""), |s: &str| s.trim().to_string()),
    ))(input)
}

/// Parse a `/`-separated category path
pub fn category_path(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(char('/'), segment)(input.trim_start())
}

/// Parse a `path=value` assignment
pub fn assignment(input: &str) -> IResult<&str, (Vec<String>, String)> {
    map(
        separated_pair(category_path, char('='), rest),
        |(path, value): (Vec<String>, &str)| (path, value.trim().to_string()),
    )(input)
}

/// Parse a complete style key into its category path
pub fn parse_style_key(input: &str) -> BarplotResult<Vec<String>> {
    all_consuming(category_path)(input.trim_end())
        .map(|(_, path)| path)
        .map_err(|_| BarplotError::InvalidStyleKey(input.to_string()))
}

/// Parse a complete `path=value` assignment
pub fn parse_assignment(input: &str) -> BarplotResult<(Vec<String>, String)> {
    all_consuming(assignment)(input)
        .map(|(_, parsed)| parsed)
        .map_err(|_| BarplotError::InvalidStyleKey(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        assert_eq!(parse_style_key("cnn").unwrap(), vec!["cnn"]);
    }

    #[test]
    fn test_nested_path_trims() {
        assert_eq!(parse_style_key(" A / x ").unwrap(), vec!["A", "x"]);
    }

    #[test]
    fn test_quoted_segment() {
        assert_eq!(
            parse_style_key(r#""run/1"/x"#).unwrap(),
            vec!["run/1".to_string(), "x".to_string()]
        );
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(parse_style_key("A//x").is_err());
        assert!(parse_style_key("").is_err());
    }

    #[test]
    fn test_assignment() {
        let (path, value) = parse_assignment("A/x = #ff0000").unwrap();
        assert_eq!(path, vec!["A", "x"]);
        assert_eq!(value, "#ff0000");
    }

    #[test]
    fn test_assignment_without_value_sign() {
        assert!(parse_assignment("A/x").is_err());
    }
}
