//! Per-request invocation values and the argument vector built from them.
//!
//! Everything here is constructed fresh for each HTTP call and dropped when the
//! call completes. Nothing is shared between requests.

use percent_encoding::percent_decode_str;
use std::fmt;

use crate::error::{DispatchError, Result};

/// Token passed to the tool in place of a problem when running everything.
pub const ALL_TOKEN: &str = "all";

/// A validated problem identifier.
///
/// Must be a single non-empty path segment that cannot be mistaken for a tool option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem(String);

impl Problem {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let reason = if raw.is_empty() {
            Some("must not be empty")
        } else if raw.starts_with('-') {
            Some("must not begin with '-'")
        } else if raw.contains('/') || raw.contains('\\') {
            Some("must be a single path segment")
        } else if raw == "." || raw == ".." {
            Some("must not be a path navigation token")
        } else if raw.contains('\0') {
            Some("contains a NUL byte")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DispatchError::InvalidProblemIdentifier { problem: raw, reason }),
            None => Ok(Problem(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query parameters in arrival order. Duplicate keys are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    ///
    /// Decoding is strict: a pair that is not valid UTF-8 after percent-decoding
    /// is rejected rather than patched with replacement characters.
    pub fn from_query(query: &str) -> Result<Self> {
        let mut parameters = Self::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(raw_key, raw_key)?;
            let value = decode_component(raw_value, raw_key)?;
            parameters.push(key, value);
        }
        Ok(parameters)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reject anything that cannot be passed to the tool as a `key=value` token.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.iter() {
            if key.is_empty() {
                return Err(DispatchError::InvalidParameter {
                    key: key.to_string(),
                    reason: "key must not be empty",
                });
            }
            if key.contains('\0') || value.contains('\0') {
                return Err(DispatchError::InvalidParameter {
                    key: key.replace('\0', "\\0"),
                    reason: "contains a NUL byte",
                });
            }
        }
        Ok(())
    }

    /// Render each pair as a `key=value` command-line token, in arrival order.
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.iter().map(|(k, v)| format!("{}={}", k, v))
    }
}

fn decode_component(raw: &str, key: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DispatchError::InvalidParameter {
            key: key.to_string(),
            reason: "is not valid UTF-8 after percent-decoding",
        })
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Parameters(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// What a single request asks the tool to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    All,
    Problem { problem: Problem, parameters: Parameters },
}

impl Invocation {
    /// Build the argument vector: `[tool, script, "all"]` or
    /// `[tool, script, problem, "k1=v1", ...]`.
    pub fn argv(&self, tool: &str, script: &str) -> ArgumentVector {
        let mut argv = vec![tool.to_string(), script.to_string()];
        match self {
            Invocation::All => argv.push(ALL_TOKEN.to_string()),
            Invocation::Problem { problem, parameters } => {
                argv.reserve(1 + parameters.len());
                argv.push(problem.as_str().to_string());
                argv.extend(parameters.tokens());
            }
        }
        ArgumentVector(argv)
    }
}

/// Ordered strings handed to the external tool. The first entry is the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    pub fn program(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ArgumentVector {
    fn from(argv: Vec<String>) -> Self {
        ArgumentVector(argv)
    }
}

impl fmt::Display for ArgumentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(raw: &str) -> Invocation {
        Invocation::Problem {
            problem: Problem::parse(raw).unwrap(),
            parameters: Parameters::new(),
        }
    }

    #[test]
    fn test_problem_accepts_plain_identifiers() {
        for raw in ["p1a", "P2b", "problem_3", "all", "x.y"] {
            assert_eq!(Problem::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_problem_rejects_bad_shapes() {
        for raw in ["", "-x", "--help", "a/b", "a\\b", "p\0", ".", ".."] {
            let err = Problem::parse(raw).unwrap_err();
            assert!(
                matches!(err, DispatchError::InvalidProblemIdentifier { .. }),
                "expected rejection for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_dash_inside_identifier_is_fine() {
        assert!(Problem::parse("p-1").is_ok());
    }

    #[test]
    fn test_run_all_argv() {
        let argv = Invocation::All.argv("octave", "Table.m");
        assert_eq!(argv.as_slice(), ["octave", "Table.m", "all"]);
        assert_eq!(argv.program(), "octave");
        assert_eq!(argv.args(), ["Table.m", "all"]);
    }

    #[test]
    fn test_problem_without_parameters() {
        let argv = problem("p1a").argv("octave", "Table.m");
        assert_eq!(argv.as_slice(), ["octave", "Table.m", "p1a"]);
    }

    #[test]
    fn test_parameters_keep_arrival_order() {
        let invocation = Invocation::Problem {
            problem: Problem::parse("p1a").unwrap(),
            parameters: [("K", "1"), ("F", "5")].into_iter().collect(),
        };
        let argv = invocation.argv("octave", "Table.m");
        assert_eq!(argv.as_slice(), ["octave", "Table.m", "p1a", "K=1", "F=5"]);
    }

    #[test]
    fn test_length_is_three_plus_parameter_count() {
        let parameters: Parameters = [("z", "1"), ("a", "2"), ("m", "3"), ("b", "4")]
            .into_iter()
            .collect();
        let invocation = Invocation::Problem {
            problem: Problem::parse("p2").unwrap(),
            parameters,
        };
        let argv = invocation.argv("tool", "script");
        assert_eq!(argv.len(), 3 + 4);
        assert_eq!(&argv.as_slice()[3..], ["z=1", "a=2", "m=3", "b=4"]);
    }

    #[test]
    fn test_duplicate_keys_are_preserved() {
        let mut parameters = Parameters::new();
        parameters.push("K", "1");
        parameters.push("K", "2");
        let invocation = Invocation::Problem {
            problem: Problem::parse("p1a").unwrap(),
            parameters,
        };
        let argv = invocation.argv("octave", "Table.m");
        assert_eq!(argv.as_slice(), ["octave", "Table.m", "p1a", "K=1", "K=2"]);
    }

    #[test]
    fn test_values_are_forwarded_verbatim() {
        let parameters: Parameters = [("expr", "a=b c"), ("empty", "")].into_iter().collect();
        let tokens: Vec<String> = parameters.tokens().collect();
        assert_eq!(tokens, ["expr=a=b c", "empty="]);
    }

    #[test]
    fn test_query_decoding_keeps_order_and_duplicates() {
        let parameters = Parameters::from_query("K=1&F=5&K=2&expr=a%3Db+c&flag&&").unwrap();
        let pairs: Vec<(&str, &str)> = parameters.iter().collect();
        assert_eq!(
            pairs,
            [("K", "1"), ("F", "5"), ("K", "2"), ("expr", "a=b c"), ("flag", "")]
        );
        assert!(Parameters::from_query("").unwrap().is_empty());
    }

    #[test]
    fn test_query_decoding_rejects_invalid_utf8() {
        let err = Parameters::from_query("K=%FF").unwrap_err();
        match err {
            DispatchError::InvalidParameter { key, .. } => assert_eq!(key, "K"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(Parameters::from_query("%C3%28=1").is_err());
    }

    #[test]
    fn test_query_decoding_passes_through_utf8() {
        let parameters = Parameters::from_query("name=%C3%A9t%C3%A9").unwrap();
        let pairs: Vec<(&str, &str)> = parameters.iter().collect();
        assert_eq!(pairs, [("name", "été")]);
    }

    #[test]
    fn test_parameter_validation() {
        let ok: Parameters = [("K", "1")].into_iter().collect();
        assert!(ok.validate().is_ok());

        let empty_key: Parameters = [("", "1")].into_iter().collect();
        assert!(matches!(
            empty_key.validate(),
            Err(DispatchError::InvalidParameter { .. })
        ));

        let nul_value: Parameters = [("K", "1\0")].into_iter().collect();
        assert!(matches!(
            nul_value.validate(),
            Err(DispatchError::InvalidParameter { .. })
        ));
    }
}
