// On-chain balance lookup over JSON-RPC, rate limited and briefly cached

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// `balanceOf(address)` function selector.
const BALANCE_OF_SELECTOR: &str = "70a08231";

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed RPC response: {0}")]
    MalformedResponse(String),
}

/// A raw token balance at a fixed number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub raw: u128,
    pub decimals: u32,
}

impl TokenAmount {
    pub fn new(raw: u128, decimals: u32) -> Self {
        Self { raw, decimals }
    }

    fn unit(&self) -> u128 {
        10u128.saturating_pow(self.decimals)
    }

    /// Raw value of `tokens` whole tokens at this amount's decimals.
    pub fn whole_tokens_raw(&self, tokens: u64) -> u128 {
        u128::from(tokens).saturating_mul(self.unit())
    }

    /// Render in whole tokens with up to four fractional digits, trailing
    /// zeros trimmed.
    pub fn format_units(&self) -> String {
        let unit = self.unit();
        let whole = self.raw / unit;
        let frac = self.raw % unit;
        if frac == 0 {
            return whole.to_string();
        }
        let frac_digits = format!("{:0width$}", frac, width = self.decimals as usize);
        let shown = frac_digits[..frac_digits.len().min(4)].trim_end_matches('0');
        if shown.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{shown}")
        }
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_units())
    }
}

/// Queries the token balance held by an address.
///
/// A successful query returning a below-threshold amount is a business
/// rejection handled by the caller, not an error; `BalanceError` covers
/// network and contract failures only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance_of(&self, address: &str) -> Result<TokenAmount, BalanceError>;
}

/// True for `0x` followed by 40 hex digits.
pub fn is_wallet_address(text: &str) -> bool {
    let Some(hex) = text.strip_prefix("0x") else {
        return false;
    };
    hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Production balance source: `eth_call` of `balanceOf` against the
/// configured token contract, behind a request rate limiter and a short-TTL
/// cache so a user hammering the wallet step cannot hammer the RPC node.
pub struct EvmBalanceSource {
    http: reqwest::Client,
    rpc_url: String,
    contract: String,
    decimals: u32,
    limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<String, u128>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl EvmBalanceSource {
    pub fn new(
        rpc_url: String,
        contract: String,
        decimals: u32,
        requests_per_second: u32,
        burst: u32,
        cache_ttl: Duration,
    ) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN));
        let cache = Cache::builder()
            .max_capacity(1024)
            .time_to_live(cache_ttl)
            .build();
        Self {
            http: reqwest::Client::new(),
            rpc_url,
            contract,
            decimals,
            limiter: Arc::new(RateLimiter::direct(quota)),
            cache,
        }
    }

    fn call_data(&self, address: &str) -> String {
        let bare = address.trim_start_matches("0x").to_ascii_lowercase();
        format!("0x{BALANCE_OF_SELECTOR}{:0>64}", bare)
    }

    async fn eth_call(&self, address: &str) -> Result<u128, BalanceError> {
        self.limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": self.contract, "data": self.call_data(address) },
                "latest"
            ],
        });
        debug!(address = %address, contract = %self.contract, "querying token balance");

        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = response.error {
            warn!(code = err.code, message = %err.message, "RPC returned an error");
            return Err(BalanceError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let result = response
            .result
            .ok_or_else(|| BalanceError::MalformedResponse("missing result field".to_string()))?;
        parse_uint256(&result)
    }
}

/// Parse a 0x-prefixed 256-bit hex word into a u128, saturating on
/// balances beyond u128 range.
fn parse_uint256(hex: &str) -> Result<u128, BalanceError> {
    let bare = hex.trim_start_matches("0x");
    if bare.is_empty() || !bare.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BalanceError::MalformedResponse(format!(
            "not a hex quantity: {hex}"
        )));
    }
    let trimmed = bare.trim_start_matches('0');
    if trimmed.len() > 32 {
        return Ok(u128::MAX);
    }
    if trimmed.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(trimmed, 16)
        .map_err(|e| BalanceError::MalformedResponse(format!("bad hex quantity {hex}: {e}")))
}

#[async_trait]
impl BalanceSource for EvmBalanceSource {
    async fn balance_of(&self, address: &str) -> Result<TokenAmount, BalanceError> {
        let key = address.to_ascii_lowercase();
        if let Some(raw) = self.cache.get(&key).await {
            debug!(address = %address, "balance cache hit");
            return Ok(TokenAmount::new(raw, self.decimals));
        }
        let raw = self.eth_call(address).await?;
        self.cache.insert(key, raw).await;
        Ok(TokenAmount::new(raw, self.decimals))
    }
}
