//! Voice client: wraps the Retell REST API used to conduct interview calls.
//!
//! The browser joins the call with the access token from `create_web_call`; everything
//! else (agent provisioning, transcript retrieval) happens server-side through here.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const RETELL_API_URL: &str = "https://api.retellai.com";
const MAX_RETRIES: u32 = 3;
/// Model backing every interviewer persona's conversation engine.
const AGENT_LLM_MODEL: &str = "gpt-4o";

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gave up after {retries} retries")]
    Exhausted { retries: u32 },
}

#[derive(Debug, Serialize)]
struct CreateWebCallRequest<'a> {
    agent_id: &'a str,
    retell_llm_dynamic_variables: &'a HashMap<String, String>,
}

/// Credentials the browser SDK needs to join a registered call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebCall {
    pub call_id: String,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
struct CreateLlmRequest<'a> {
    model: &'a str,
    general_prompt: &'a str,
    begin_message: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CreateLlmResponse {
    llm_id: String,
}

#[derive(Debug, Serialize)]
struct ResponseEngine<'a> {
    #[serde(rename = "type")]
    engine_type: &'a str,
    llm_id: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateAgentRequest<'a> {
    response_engine: ResponseEngine<'a>,
    voice_id: &'a str,
    agent_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateAgentResponse {
    agent_id: String,
}

#[derive(Clone)]
pub struct VoiceClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl VoiceClient {
    pub fn new(api_key: String) -> Result<Self, VoiceError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            api_key,
            base_url: RETELL_API_URL.to_string(),
        })
    }

    /// Registers a browser call for `agent_id` with the interview's dynamic variables.
    pub async fn create_web_call(
        &self,
        agent_id: &str,
        dynamic_variables: &HashMap<String, String>,
    ) -> Result<WebCall, VoiceError> {
        let body = CreateWebCallRequest {
            agent_id,
            retell_llm_dynamic_variables: dynamic_variables,
        };
        self.send(Method::POST, "/v2/create-web-call", Some(&body))
            .await
    }

    /// Fetches the full call record (transcript, timestamps, call_analysis) as raw JSON.
    pub async fn get_call(&self, call_id: &str) -> Result<Value, VoiceError> {
        let path = format!("/v2/get-call/{call_id}");
        self.send::<(), Value>(Method::GET, &path, None).await
    }

    /// Provisions the conversation engine and the voice agent for one interviewer persona.
    /// Returns the agent id to store on the interviewer row.
    pub async fn create_agent(
        &self,
        agent_name: &str,
        voice_id: &str,
        general_prompt: &str,
        begin_message: Option<&str>,
    ) -> Result<String, VoiceError> {
        let llm: CreateLlmResponse = self
            .send(
                Method::POST,
                "/create-retell-llm",
                Some(&CreateLlmRequest {
                    model: AGENT_LLM_MODEL,
                    general_prompt,
                    begin_message,
                }),
            )
            .await?;

        let agent: CreateAgentResponse = self
            .send(
                Method::POST,
                "/create-agent",
                Some(&CreateAgentRequest {
                    response_engine: ResponseEngine {
                        engine_type: "retell-llm",
                        llm_id: &llm.llm_id,
                    },
                    voice_id,
                    agent_name,
                }),
            )
            .await?;

        debug!("Provisioned voice agent {} ({agent_name})", agent.agent_id);
        Ok(agent.agent_id)
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, VoiceError> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error: Option<VoiceError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Voice API call to {path} failed (attempt {attempt}), retrying after {}ms...",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(&self.api_key);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(VoiceError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                last_error = Some(VoiceError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(VoiceError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json::<T>().await?);
        }

        Err(last_error.unwrap_or(VoiceError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_call_request_shape() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Ada".to_string());
        let body = CreateWebCallRequest {
            agent_id: "agent_123",
            retell_llm_dynamic_variables: &vars,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["agent_id"], "agent_123");
        assert_eq!(json["retell_llm_dynamic_variables"]["name"], "Ada");
    }

    #[test]
    fn test_agent_request_uses_retell_llm_engine() {
        let body = CreateAgentRequest {
            response_engine: ResponseEngine {
                engine_type: "retell-llm",
                llm_id: "llm_1",
            },
            voice_id: "11labs-Chloe",
            agent_name: "Lisa",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_engine"]["type"], "retell-llm");
        assert_eq!(json["voice_id"], "11labs-Chloe");
    }
}
