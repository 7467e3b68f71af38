use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserialize an optional UUID from query strings, treating the empty
/// string as absent.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        cohort_id: Option<Uuid>,
    }

    #[test]
    fn test_empty_string_is_none() {
        let params: Params = serde_json::from_str(r#"{"cohort_id":""}"#).unwrap();
        assert!(params.cohort_id.is_none());
    }

    #[test]
    fn test_valid_uuid_parses() {
        let id = Uuid::new_v4();
        let params: Params =
            serde_json::from_str(&format!(r#"{{"cohort_id":"{}"}}"#, id)).unwrap();
        assert_eq!(params.cohort_id, Some(id));
    }

    #[test]
    fn test_invalid_uuid_errors() {
        let result: Result<Params, _> = serde_json::from_str(r#"{"cohort_id":"nope"}"#);
        assert!(result.is_err());
    }
}
