use serde::{Deserialize, Serialize};

use crate::settings::MinerNetSettings;

/// What a miner registers with the directory: where to reach it and who
/// it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerInfo {
    pub address: String,
    pub public_key: String,
}

#[derive(Serialize)]
struct PublicKeyRequest<'a> {
    public_key: &'a str,
}

/// Client for the external registry/directory service. The directory hands
/// out network settings at registration and peer addresses on demand.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    base: String,
    http: reqwest::Client,
}

impl DirectoryClient {
    pub fn new(base: String) -> Self {
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    pub async fn register(&self, info: &MinerInfo) -> Result<MinerNetSettings, reqwest::Error> {
        self.http
            .post(format!("http://{}/register/", self.base))
            .json(info)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn heart_beat(&self, public_key: &str) -> Result<(), reqwest::Error> {
        self.http
            .post(format!("http://{}/heartbeat/", self.base))
            .json(&PublicKeyRequest { public_key })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn get_nodes(&self, public_key: &str) -> Result<Vec<String>, reqwest::Error> {
        self.http
            .post(format!("http://{}/nodes/", self.base))
            .json(&PublicKeyRequest { public_key })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
