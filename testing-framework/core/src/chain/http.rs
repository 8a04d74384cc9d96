use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, error};

use super::{ChainClient, ChainError, Denomination, SendReceipt, derive_address};
use crate::{
    accounts::{Address, PrivateKey},
    config::{ConfigError, SparkConfig},
};

pub const GET_BALANCE: &str = "/wallet/getbalance";
pub const SEND_TRANSACTION: &str = "/wallet/sendtransaction";

#[derive(Deserialize)]
struct BalanceResponse {
    balance: u128,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    owner_key: &'a str,
    to: String,
    amount: u128,
}

/// Thin async client for the development node's wallet endpoints.
///
/// No request timeout is configured: a hung node hangs the caller.
#[derive(Clone)]
pub struct HttpChainClient {
    base_url: Url,
    client: Client,
    funder: PrivateKey,
    denomination: Denomination,
}

impl HttpChainClient {
    #[must_use]
    pub fn new(base_url: Url, funder: PrivateKey, denomination: Denomination) -> Self {
        Self {
            base_url,
            client: Client::new(),
            funder,
            denomination,
        }
    }

    /// Client for `config.node_url`, funded by the configured funder key.
    pub fn from_config(config: &SparkConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.node_url).map_err(|err| ConfigError::InvalidValue {
            key: "nodeUrl".to_owned(),
            value: config.node_url.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self::new(
            base_url,
            config.funder_key(),
            config.denomination(),
        ))
    }

    /// Base node URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, ChainError>
    where
        T: DeserializeOwned,
    {
        let response = self.client.get(url).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    async fn post_json_decode<T, R>(&self, path: &str, body: &T) -> Result<R, ChainError>
    where
        T: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.join_base(path))
            .json(body)
            .send()
            .await?;
        Ok(checked(response).await?.json().await?)
    }

    fn join_base(&self, path: &str) -> Url {
        let trimmed = path.trim_start_matches('/');
        match self.base_url.join(trimmed) {
            Ok(url) => url,
            Err(err) => {
                error!(
                    error = %err,
                    base = %self.base_url,
                    path,
                    "failed to join url; falling back to base url"
                );
                self.base_url.clone()
            }
        }
    }
}

async fn checked(response: Response) -> Result<Response, ChainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    error!(%status, %body, "chain node request failed");
    Err(ChainError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ChainClient for HttpChainClient {
    fn address_from_private_key(&self, key: &PrivateKey) -> Address {
        derive_address(key)
    }

    fn default_private_key(&self) -> &PrivateKey {
        &self.funder
    }

    fn denomination(&self) -> &Denomination {
        &self.denomination
    }

    async fn get_balance(&self, address: &Address) -> Result<u128, ChainError> {
        let mut url = self.join_base(GET_BALANCE);
        url.query_pairs_mut()
            .append_pair("address", &address.to_string());

        debug!(%address, "querying balance");
        let response: BalanceResponse = self.get_json(url).await?;
        Ok(response.balance)
    }

    async fn send_transaction(
        &self,
        to: &Address,
        amount: u128,
    ) -> Result<SendReceipt, ChainError> {
        let request = SendRequest {
            owner_key: self.funder.as_str(),
            to: to.to_string(),
            amount,
        };

        debug!(%to, amount, "submitting funding transfer");
        self.post_json_decode(SEND_TRANSACTION, &request).await
    }
}
