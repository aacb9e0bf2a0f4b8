use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamically typed script value, as found in command params and the
/// variable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Bool(bool),
  Integer(i64),
  Float(f64),
  String(String),
}

impl Default for Value {
  fn default() -> Self {
    Value::Integer(0)
  }
}

impl Value {
  pub fn to_f64(&self) -> f64 {
    match self {
      Value::Bool(bool) => f64::from(u8::from(*bool)),
      Value::Integer(integer) => *integer as f64,
      Value::Float(float) => *float,
      Value::String(string) => string.trim().parse::<f64>().unwrap_or(0.),
    }
  }

  pub fn to_i64(&self) -> i64 {
    match self {
      Value::Integer(integer) => *integer,
      _ => self.to_f64() as i64,
    }
  }

  pub fn to_bool(&self) -> bool {
    match self {
      Value::Bool(bool) => *bool,
      Value::Integer(integer) => *integer != 0,
      Value::Float(float) => *float != 0.,
      Value::String(string) => {
        !(string.is_empty() || string == "0" || string.eq_ignore_ascii_case("false"))
      }
    }
  }

  pub fn is_int(&self) -> bool {
    match self {
      Value::Integer(_) | Value::Bool(_) => true,
      Value::Float(float) => float.fract() == 0.,
      Value::String(string) => string.trim().parse::<i64>().is_ok(),
    }
  }

  fn is_numeric(&self) -> bool {
    match self {
      Value::String(string) => string.trim().parse::<f64>().is_ok(),
      _ => true,
    }
  }

  /// Negative when `self` sorts first, zero when equal, positive otherwise.
  /// Numbers compare numerically; anything involving a non-numeric string
  /// compares as case-insensitive text.
  pub fn compare(&self, other: &Value) -> f64 {
    if self.is_numeric() && other.is_numeric() {
      let (a, b) = (self.to_f64(), other.to_f64());
      if a == b {
        0.
      } else {
        a - b
      }
    } else {
      let a = self.to_string().to_lowercase();
      let b = other.to_string().to_lowercase();
      match a.cmp(&b) {
        std::cmp::Ordering::Less => -1.,
        std::cmp::Ordering::Equal => 0.,
        std::cmp::Ordering::Greater => 1.,
      }
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Bool(bool) => write!(f, "{bool}"),
      Value::Integer(integer) => write!(f, "{integer}"),
      Value::Float(float) if float.fract() == 0. && float.is_finite() => {
        write!(f, "{}", *float as i64)
      }
      Value::Float(float) => write!(f, "{float}"),
      Value::String(string) => f.write_str(string),
    }
  }
}

impl From<f64> for Value {
  fn from(float: f64) -> Self {
    Value::Float(float)
  }
}

impl From<i64> for Value {
  fn from(integer: i64) -> Self {
    Value::Integer(integer)
  }
}

impl From<bool> for Value {
  fn from(bool: bool) -> Self {
    Value::Bool(bool)
  }
}

impl From<String> for Value {
  fn from(string: String) -> Self {
    Value::String(string)
  }
}

impl From<&str> for Value {
  fn from(string: &str) -> Self {
    Value::String(string.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numeric_strings_compare_as_numbers() {
    assert_eq!(Value::from("10").compare(&Value::Integer(10)), 0.);
    assert!(Value::from("9").compare(&Value::from("10")) < 0.);
  }

  #[test]
  fn text_compares_case_insensitively() {
    assert_eq!(Value::from("Alice").compare(&Value::from("alice")), 0.);
    assert!(Value::from("bob").compare(&Value::from("Alice")) > 0.);
  }

  #[test]
  fn coercions() {
    assert_eq!(Value::from("  3.5 ").to_f64(), 3.5);
    assert_eq!(Value::from("abc").to_f64(), 0.);
    assert!(!Value::from("false").to_bool());
    assert!(Value::Integer(2).to_bool());
    assert_eq!(Value::Float(4.).to_string(), "4");
  }

  #[test]
  fn untagged_json_picks_the_narrowest_variant() {
    let values: Vec<Value> = serde_json::from_str(r#"[true, 3, 3.5, "x"]"#).unwrap();
    assert_eq!(
      values,
      vec![
        Value::Bool(true),
        Value::Integer(3),
        Value::Float(3.5),
        Value::from("x")
      ]
    );
  }
}
