use std::sync::LazyLock;

use envconfig::Envconfig;

use crate::Severity;

/// Environment overrides, read once on first use.
#[derive(Envconfig, Debug, Default)]
pub struct SevlogConfig {
    #[envconfig(from = "SEVLOG_LEVEL")]
    pub level: Option<Severity>,
    #[envconfig(from = "SEVLOG_TAG")]
    pub tag: Option<String>,
    #[envconfig(from = "SEVLOG_FILE")]
    pub file: Option<String>,
}

pub static SEVLOG_CONFIG: LazyLock<SevlogConfig> = LazyLock::new(|| {
    SevlogConfig::init_from_env().unwrap_or_else(|err| {
        eprintln!("sevlog: ignoring environment configuration: {err}");
        SevlogConfig::default()
    })
});

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = SevlogConfig::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(config.level, None);
        assert_eq!(config.tag, None);
        assert_eq!(config.file, None);
    }

    #[test]
    fn test_overrides() {
        let config = SevlogConfig::init_from_hashmap(&vars(&[
            ("SEVLOG_LEVEL", "warn"),
            ("SEVLOG_TAG", "RTB"),
            ("SEVLOG_FILE", "/tmp/app.log"),
        ]))
        .unwrap();
        assert_eq!(config.level, Some(Severity::Warning));
        assert_eq!(config.tag.as_deref(), Some("RTB"));
        assert_eq!(config.file.as_deref(), Some("/tmp/app.log"));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let result = SevlogConfig::init_from_hashmap(&vars(&[("SEVLOG_LEVEL", "loud")]));
        assert!(matches!(
            result,
            Err(envconfig::Error::ParseError {
                name: "SEVLOG_LEVEL"
            })
        ));
    }
}
