//! Projection definition strings.
//!
//! A definition is a whitespace-separated list of `+key` and `+key=value`
//! tokens, for example:
//!
//! ```text
//! +proj=utm +zone=33 +ellps=WGS84 +units=m
//! ```
//!
//! Keys keep their textual order, lookups take the first occurrence, and
//! unrecognized keys ride along untouched so a definition survives a
//! parse/format round trip.

use crate::error::ParseError;

/// One `+key` or `+key=value` token.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub key: String,
    pub value: Option<String>,
}

/// An ordered projection parameter list.
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Parses a definition string.
    ///
    /// Every token must start with `+` and carry a non-empty key; a
    /// malformed token fails the whole parse.
    pub fn parse(definition: &str) -> Result<Self, ParseError> {
        let mut params = Vec::new();
        for token in definition.split_whitespace() {
            let body = token
                .strip_prefix('+')
                .ok_or_else(|| ParseError::Token(token.to_owned()))?;
            let (key, value) = match body.split_once('=') {
                Some((k, v)) => (k, Some(v.to_owned())),
                None => (body, None),
            };
            if key.is_empty() {
                return Err(ParseError::Token(token.to_owned()));
            }
            params.push(Param {
                key: key.to_owned(),
                value,
            });
        }
        Ok(ParamList { params })
    }

    /// First occurrence of `key`, if any.
    fn get(&self, key: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.key == key)
    }

    /// Whether `key` appears at all, with or without a value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// String value of `key`. `None` when the key is absent or valueless.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|p| p.value.as_deref())
    }

    /// Numeric value of `key`. Absence is `Ok(None)`; a present key whose
    /// value does not parse as a number is an error.
    pub fn f64_value(&self, key: &str) -> Result<Option<f64>, ParseError> {
        let Some(param) = self.get(key) else {
            return Ok(None);
        };
        let text = param.value.as_deref().unwrap_or("");
        text.trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(key, text, "expected a number"))
    }

    /// Angular value of `key` in decimal degrees, converted to radians.
    pub fn angle_value(&self, key: &str) -> Result<Option<f64>, ParseError> {
        Ok(self.f64_value(key)?.map(f64::to_radians))
    }

    /// Comma-separated numeric list, as used by `+towgs84`.
    pub fn f64_list(&self, key: &str) -> Result<Option<Vec<f64>>, ParseError> {
        let Some(text) = self.value(key) else {
            return Ok(None);
        };
        let mut values = Vec::new();
        for part in text.split(',') {
            let v = part
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(key, text, "expected comma-separated numbers"))?;
            values.push(v);
        }
        Ok(Some(values))
    }

    /// The canonical definition text: tokens joined by single spaces.
    pub fn to_definition(&self) -> String {
        let mut out = String::new();
        for param in &self.params {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push('+');
            out.push_str(&param.key);
            if let Some(value) = &param.value {
                out.push('=');
                out.push_str(value);
            }
        }
        out
    }
}

fn invalid(key: &str, value: &str, hint: &str) -> ParseError {
    ParseError::InvalidParameter(format!("{key}={value}: {hint}"))
}
