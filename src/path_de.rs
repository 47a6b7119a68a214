use serde::de::DeserializeOwned;

fn with_path<'de, D, T>(de: D, what: &str) -> Result<T, String>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at {what} path {path} → {}", err.into_inner()))
        }
    }
}

/// Deserialize a manifest with key-path context in error messages.
pub fn from_yaml_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    with_path(serde_yaml::Deserializer::from_str(src), "YAML")
}

pub fn from_toml_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    with_path(toml::Deserializer::new(src), "TOML")
}

pub fn from_json_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    with_path(de, "JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, serde::Deserialize)]
    struct Outer {
        #[allow(dead_code)]
        inner: BTreeMap<String, u32>,
    }

    #[test]
    fn errors_name_the_offending_path() {
        let err = from_yaml_with_path::<Outer>("inner:\n  a: 1\n  b: nope\n").unwrap_err();
        assert!(err.contains("inner.b"), "{err}");
        let err = from_json_with_path::<Outer>(r#"{"inner": {"a": "x"}}"#).unwrap_err();
        assert!(err.contains("inner.a"), "{err}");
        let err = from_toml_with_path::<Outer>("[inner]\na = -1\n").unwrap_err();
        assert!(err.contains("inner.a"), "{err}");
    }
}
