//! Per-API YAML definition (`src/test/resources/<api>.yml`).
use crate::error::HarvestError;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiDefinition {
    /// URI template, e.g. `/individuals/{idType}/{idValue}?taxYear={taxYear}`.
    pub uri: String,
    #[serde(rename = "kongConfig", default)]
    pub kong_config: Vec<KongConfig>,
}

/// Kong routing/consumer record.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct KongConfig {
    #[serde(rename = "serviceName")]
    pub service_name: String,
    #[serde(rename = "consumerName")]
    pub consumer_name: String,
}

impl ApiDefinition {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parse API definition YAML")
    }

    /// The first Kong record, which names the service and consumer in the CSV.
    pub fn primary_kong(&self) -> Result<&KongConfig, HarvestError> {
        self.kong_config
            .first()
            .ok_or_else(|| HarvestError::format("API definition has an empty kongConfig"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"
uri: /individuals/{idType}/{idValue}/benefits?taxYear={taxYear}
method: GET
kongConfig:
  - serviceName: benefits-service
    consumerName: benefits-consumer
    plugins: [rate-limiting]
  - serviceName: benefits-service-v2
    consumerName: other
"#;

    #[test]
    fn parses_uri_and_first_kong_record() {
        let definition = ApiDefinition::from_yaml(DEFINITION).expect("parse definition");
        assert_eq!(
            definition.uri,
            "/individuals/{idType}/{idValue}/benefits?taxYear={taxYear}"
        );
        let kong = definition.primary_kong().expect("kong record");
        assert_eq!(kong.service_name, "benefits-service");
        assert_eq!(kong.consumer_name, "benefits-consumer");
    }

    #[test]
    fn missing_kong_config_is_a_format_error() {
        let definition = ApiDefinition::from_yaml("uri: /ping\n").expect("parse definition");
        assert!(matches!(
            definition.primary_kong(),
            Err(HarvestError::Format(_))
        ));
    }

    #[test]
    fn missing_uri_fails_to_parse() {
        assert!(ApiDefinition::from_yaml("kongConfig: []\n").is_err());
    }
}
