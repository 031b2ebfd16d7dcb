use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Uniform outcome of every backend-facing operation: either data or an
/// error message, never both and never neither.
///
/// Serializes as the `{ "data": ..., "error": ... }` envelope with the unused
/// side set to `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<T> {
    Data(T),
    Error(String),
}

impl<T> FetchResult<T> {
    pub fn error_message(message: impl fmt::Display) -> Self {
        FetchResult::Error(message.to_string())
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchResult::Data(data) => Some(data),
            FetchResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchResult::Data(_) => None,
            FetchResult::Error(message) => Some(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FetchResult::Data(_))
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchResult::Data(data) => Some(data),
            FetchResult::Error(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            FetchResult::Data(data) => Ok(data),
            FetchResult::Error(message) => Err(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchResult<U> {
        match self {
            FetchResult::Data(data) => FetchResult::Data(f(data)),
            FetchResult::Error(message) => FetchResult::Error(message),
        }
    }

    /// Chain a fallible step that produces another `FetchResult`.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> FetchResult<U>) -> FetchResult<U> {
        match self {
            FetchResult::Data(data) => f(data),
            FetchResult::Error(message) => FetchResult::Error(message),
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for FetchResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => FetchResult::Data(data),
            Err(e) => FetchResult::Error(e.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for FetchResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FetchResult", 2)?;
        s.serialize_field("data", &self.data())?;
        s.serialize_field("error", &self.error())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_has_exactly_one_side() {
        let ok: FetchResult<Vec<i32>> = FetchResult::Data(vec![1]);
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"data": [1], "error": null}));

        let err: FetchResult<Vec<i32>> = FetchResult::error_message("boom");
        assert_eq!(serde_json::to_value(&err).unwrap(), json!({"data": null, "error": "boom"}));
    }

    #[test]
    fn test_accessors() {
        let ok = FetchResult::Data(3);
        assert_eq!(ok.data(), Some(&3));
        assert_eq!(ok.error(), None);
        assert_eq!(ok.clone().map(|n| n * 2).into_data(), Some(6));

        let err: FetchResult<i32> = Err::<i32, _>("nope").into();
        assert_eq!(err.error(), Some("nope"));
        assert_eq!(err.into_result(), Err("nope".to_string()));
    }
}
