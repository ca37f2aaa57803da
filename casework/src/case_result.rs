/// Two-variant outcome of one case invocation.
///
/// Expected failures travel as `Err` values through every layer instead of
/// being raised; a panic inside a case is a programming error, not a domain
/// failure. Each variant optionally carries an `origin` tag identifying the
/// invocation that produced it, used to disambiguate overlapping runs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CaseResult<V, E> {
    Ok { value: V, origin: Option<String> },
    Err { error: E, origin: Option<String> },
}

impl<V, E> CaseResult<V, E> {
    pub fn ok(value: V) -> Self {
        CaseResult::Ok {
            value,
            origin: None,
        }
    }

    pub fn ok_with_origin(value: V, origin: impl Into<String>) -> Self {
        CaseResult::Ok {
            value,
            origin: Some(origin.into()),
        }
    }

    pub fn err(error: E) -> Self {
        CaseResult::Err {
            error,
            origin: None,
        }
    }

    pub fn err_with_origin(error: E, origin: impl Into<String>) -> Self {
        CaseResult::Err {
            error,
            origin: Some(origin.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CaseResult::Ok { .. })
    }

    pub fn is_err(&self) -> bool {
        matches!(self, CaseResult::Err { .. })
    }

    pub fn value(&self) -> Option<&V> {
        match self {
            CaseResult::Ok { value, .. } => Some(value),
            CaseResult::Err { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            CaseResult::Ok { .. } => None,
            CaseResult::Err { error, .. } => Some(error),
        }
    }

    pub fn origin(&self) -> Option<&str> {
        match self {
            CaseResult::Ok { origin, .. } | CaseResult::Err { origin, .. } => origin.as_deref(),
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            CaseResult::Ok { value, .. } => Some(value),
            CaseResult::Err { .. } => None,
        }
    }

    pub fn into_error(self) -> Option<E> {
        match self {
            CaseResult::Ok { .. } => None,
            CaseResult::Err { error, .. } => Some(error),
        }
    }

    /// Drops the origin tag and converts into a plain `Result`.
    pub fn into_result(self) -> Result<V, E> {
        match self {
            CaseResult::Ok { value, .. } => Ok(value),
            CaseResult::Err { error, .. } => Err(error),
        }
    }

    /// Re-tags the result with the given origin, replacing any existing tag.
    pub fn with_origin(self, origin: impl Into<String>) -> Self {
        match self {
            CaseResult::Ok { value, .. } => CaseResult::Ok {
                value,
                origin: Some(origin.into()),
            },
            CaseResult::Err { error, .. } => CaseResult::Err {
                error,
                origin: Some(origin.into()),
            },
        }
    }
}

impl<V, E> From<Result<V, E>> for CaseResult<V, E> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => CaseResult::ok(value),
            Err(error) => CaseResult::err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok() {
        let result: CaseResult<i32, String> = CaseResult::ok(42);
        assert!(result.is_ok());
        assert!(!result.is_err());
        assert_eq!(result.value(), Some(&42));
        assert_eq!(result.error(), None);
        assert_eq!(result.origin(), None);
        assert_eq!(result.into_value(), Some(42));
    }

    #[test]
    fn test_ok_with_origin() {
        let result: CaseResult<i32, String> = CaseResult::ok_with_origin(7, "loader");
        assert!(result.is_ok());
        assert_eq!(result.value(), Some(&7));
        assert_eq!(result.origin(), Some("loader"));
    }

    #[test]
    fn test_err() {
        let result: CaseResult<i32, String> = CaseResult::err("boom".to_string());
        assert!(result.is_err());
        assert!(!result.is_ok());
        assert_eq!(result.error(), Some(&"boom".to_string()));
        assert_eq!(result.value(), None);
        assert_eq!(result.origin(), None);
        assert_eq!(result.into_error(), Some("boom".to_string()));
    }

    #[test]
    fn test_err_with_origin() {
        let result: CaseResult<i32, String> = CaseResult::err_with_origin("boom".to_string(), "form");
        assert!(result.is_err());
        assert_eq!(result.origin(), Some("form"));
    }

    #[test]
    fn test_from_result() {
        let result: CaseResult<i32, String> = Ok(3).into();
        assert_eq!(result, CaseResult::ok(3));

        let result: CaseResult<i32, String> = Err("bad".to_string()).into();
        assert_eq!(result, CaseResult::err("bad".to_string()));
        assert_eq!(result.origin(), None);
    }

    #[test]
    fn test_into_result() {
        let result: CaseResult<i32, String> = CaseResult::ok_with_origin(5, "anywhere");
        assert_eq!(result.into_result(), Ok(5));

        let result: CaseResult<i32, String> = CaseResult::err("bad".to_string());
        assert_eq!(result.into_result(), Err("bad".to_string()));
    }

    #[test]
    fn test_with_origin_retag() {
        let result: CaseResult<i32, String> = CaseResult::ok_with_origin(1, "old");
        let result = result.with_origin("new");
        assert_eq!(result.origin(), Some("new"));
    }
}
