//! Helpers shared by the adapters' request mappers.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// Deserialize tool arguments into the tool's parameter struct.
pub fn parse<T: DeserializeOwned>(arguments: &Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments.clone()
    };
    serde_json::from_value(arguments)
        .map_err(|e| Error::InvalidData(format!("Invalid arguments: {}", e)))
}

/// Page number, defaulting to the first page.
pub fn page_or_default(page: Option<u32>) -> u32 {
    page.filter(|p| *p > 0).unwrap_or(1)
}

/// Split `owner/repo` into its two halves.
///
/// Empty and dot-only halves are rejected; they would resolve to a
/// different upstream path.
pub fn split_repository(repository: &str) -> Result<(&str, &str)> {
    let usable = |part: &str| !part.is_empty() && part != "." && part != "..";
    match repository.split_once('/') {
        Some((owner, repo)) if usable(owner) && usable(repo) && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(Error::InvalidData(format!(
            "Repository must be in owner/repo format: {}",
            repository
        ))),
    }
}

/// Percent-encode a value used as a single URL path segment.
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Params {
        title: String,
        #[serde(default)]
        page: Option<u32>,
    }

    #[test]
    fn test_parse() {
        let params: Params = parse(&json!({"title": "t", "page": 2})).unwrap();
        assert_eq!(params.title, "t");
        assert_eq!(params.page, Some(2));

        assert!(parse::<Params>(&json!({"page": 2})).is_err());
        assert!(parse::<Params>(&Value::Null).is_err());
    }

    #[test]
    fn test_page_or_default() {
        assert_eq!(page_or_default(None), 1);
        assert_eq!(page_or_default(Some(0)), 1);
        assert_eq!(page_or_default(Some(4)), 4);
    }

    #[test]
    fn test_split_repository() {
        assert_eq!(split_repository("o/r").unwrap(), ("o", "r"));
        assert!(split_repository("o").is_err());
        assert!(split_repository("/r").is_err());
        assert!(split_repository("o/").is_err());
        assert!(split_repository("o/r/x").is_err());
        assert!(split_repository("../user").is_err());
        assert!(split_repository("o/.").is_err());
        assert_eq!(split_repository("o/r.js").unwrap(), ("o", "r.js"));
    }

    #[test]
    fn test_path_segment() {
        assert_eq!(path_segment("group/project"), "group%2Fproject");
        assert_eq!(path_segment("42"), "42");
    }
}
