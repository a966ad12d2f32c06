//! Brazilian administrative divisions (states and municipalities) for
//! populating place-selection lists.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DivisionsConfig;
use crate::error::{Error, Result};
use crate::geo::provider_client;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrazilianState {
    pub id: u32,
    pub sigla: String,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub id: u32,
    pub nome: String,
}

/// Source of state and municipality listings, both ordered by name.
#[async_trait]
pub trait DivisionProvider: Send + Sync {
    async fn states(&self) -> Result<Vec<BrazilianState>>;
    async fn municipalities(&self, state_id: u32) -> Result<Vec<Municipality>>;
}

/// Client for the IBGE localidades API.
#[derive(Debug, Clone)]
pub struct IbgeClient {
    client: Client,
    base_url: String,
}

impl IbgeClient {
    pub fn new(config: &DivisionsConfig) -> Result<Self> {
        Ok(Self {
            client: provider_client(&config.user_agent, config.timeout)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch<T>(&self, path: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "fetching administrative divisions");

        let response = self
            .client
            .get(&url)
            .query(&[("orderBy", "nome")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                message: format!("divisions provider returned HTTP {status} for {path}"),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| Error::Upstream {
            message: format!("malformed divisions response for {path}: {err}"),
        })
    }
}

#[async_trait]
impl DivisionProvider for IbgeClient {
    async fn states(&self) -> Result<Vec<BrazilianState>> {
        self.fetch("/estados").await
    }

    async fn municipalities(&self, state_id: u32) -> Result<Vec<Municipality>> {
        self.fetch(&format!("/estados/{state_id}/municipios")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ibge_state_payload() {
        // IBGE includes a nested `regiao` object that we ignore.
        let body = r#"[{"id":41,"sigla":"PR","nome":"Paraná",
                        "regiao":{"id":4,"sigla":"S","nome":"Sul"}}]"#;
        let states: Vec<BrazilianState> = serde_json::from_str(body).unwrap();
        assert_eq!(
            states,
            vec![BrazilianState {
                id: 41,
                sigla: "PR".to_string(),
                nome: "Paraná".to_string(),
            }]
        );
    }

    #[test]
    fn decodes_municipality_payload() {
        let body = r#"[{"id":4106902,"nome":"Curitiba","microrregiao":{"id":41037}}]"#;
        let cities: Vec<Municipality> = serde_json::from_str(body).unwrap();
        assert_eq!(cities[0].id, 4106902);
        assert_eq!(cities[0].nome, "Curitiba");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let config = DivisionsConfig {
            base_url: "http://localhost:9001/".to_string(),
            ..DivisionsConfig::default()
        };
        let client = IbgeClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9001");
    }
}
