//! 交易数据源
//!
//! `TransactionSource` 抽象了签名历史分页和交易获取，支持真实 RPC 与内存 Mock 两种实现

use async_trait::async_trait;
use serde_json::{Value, json};
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcRequest;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::UiTransactionEncoding;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{InspectorConfig, SolanaRpcClient};
use crate::parser::transaction_adapter::AdapterError;
use crate::parser::types::{SignatureInfo, TransactionRecord};

/// 数据源错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("RPC 调用失败: {0}")]
    Rpc(String),
    #[error("无效的签名: {0}")]
    InvalidSignature(String),
    #[error("无效的地址: {0}")]
    InvalidAddress(String),
    #[error("响应格式错误: {0}")]
    MalformedResponse(String),
    #[error("Mock 数据错误: {0}")]
    Fixture(String),
}

impl From<AdapterError> for FetchError {
    fn from(e: AdapterError) -> Self {
        FetchError::MalformedResponse(e.to_string())
    }
}

/// 解析 base58 地址
pub fn parse_address(address: &str) -> Result<Pubkey, FetchError> {
    Pubkey::from_str(address).map_err(|_| FetchError::InvalidAddress(address.to_string()))
}

/// 签名历史分页查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureQuery {
    /// 从该签名之后（更早）开始
    pub before: Option<String>,
    /// 到该签名为止（不包含）
    pub until: Option<String>,
    pub limit: usize,
}

impl SignatureQuery {
    pub fn new(limit: usize) -> Self {
        Self { before: None, until: None, limit }
    }
}

#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// 当前 slot，用作启动时的连通性检查
    async fn get_slot(&self) -> Result<u64, FetchError>;

    /// 按时间倒序返回一页签名
    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        query: &SignatureQuery,
    ) -> Result<Vec<SignatureInfo>, FetchError>;

    /// 获取交易，不存在时返回 None
    async fn get_transaction(&self, signature: &str)
    -> Result<Option<TransactionRecord>, FetchError>;
}

/// 基于 Solana JSON-RPC 的数据源
pub struct RpcTransactionSource {
    rpc: Arc<SolanaRpcClient>,
    commitment: CommitmentConfig,
    encoding: UiTransactionEncoding,
    record_dir: Option<PathBuf>,
}

impl RpcTransactionSource {
    pub fn new(config: &InspectorConfig) -> Self {
        let rpc = Arc::new(SolanaRpcClient::new_with_commitment(
            config.rpc_url.clone(),
            config.commitment,
        ));
        Self::with_client(rpc, config)
    }

    /// 复用已有的 RPC 客户端
    pub fn with_client(rpc: Arc<SolanaRpcClient>, config: &InspectorConfig) -> Self {
        Self {
            rpc,
            commitment: config.commitment,
            encoding: config.encoding,
            record_dir: config.record_dir.clone(),
        }
    }

    fn transaction_config(&self) -> RpcTransactionConfig {
        RpcTransactionConfig {
            encoding: Some(self.encoding),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        }
    }

    /// 保存交易原始 JSON，失败只记录日志
    fn save_recording(&self, dir: &Path, signature: &str, value: &Value) {
        if let Err(e) = fs::create_dir_all(dir) {
            warn!("无法创建录制目录 {:?}: {}", dir, e);
            return;
        }
        let file_path = dir.join(format!("{signature}.json"));
        let json = match serde_json::to_string_pretty(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("序列化交易失败 {}: {}", signature, e);
                return;
            }
        };
        match fs::write(&file_path, json) {
            Ok(()) => debug!("已录制交易 {:?}", file_path),
            Err(e) => warn!("保存录制失败: {} (path: {:?})", e, file_path),
        }
    }
}

fn parse_signature(signature: &str) -> Result<Signature, FetchError> {
    Signature::from_str(signature).map_err(|_| FetchError::InvalidSignature(signature.to_string()))
}

#[async_trait]
impl TransactionSource for RpcTransactionSource {
    async fn get_slot(&self) -> Result<u64, FetchError> {
        self.rpc.get_slot().await.map_err(|e| FetchError::Rpc(e.to_string()))
    }

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        query: &SignatureQuery,
    ) -> Result<Vec<SignatureInfo>, FetchError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            before: query.before.as_deref().map(parse_signature).transpose()?,
            until: query.until.as_deref().map(parse_signature).transpose()?,
            limit: Some(query.limit),
            commitment: Some(self.commitment),
        };

        let statuses = self
            .rpc
            .get_signatures_for_address_with_config(address, config)
            .await
            .map_err(|e| FetchError::Rpc(e.to_string()))?;

        Ok(statuses
            .into_iter()
            .map(|status| {
                // 错误类型在不同版本间不同，统一以 JSON 文本表示
                let err = status
                    .err
                    .as_ref()
                    .and_then(|err| serde_json::to_value(err).ok())
                    .filter(|value| !value.is_null())
                    .map(|value| value.to_string());
                SignatureInfo {
                    signature: status.signature,
                    slot: status.slot,
                    err,
                    block_time: status.block_time,
                }
            })
            .collect())
    }

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, FetchError> {
        parse_signature(signature)?;

        // 直接取原始 JSON：既能保存为录制文件，也能区分"交易不存在"(null)
        let value: Value = self
            .rpc
            .send(RpcRequest::GetTransaction, json!([signature, self.transaction_config()]))
            .await
            .map_err(|e| FetchError::Rpc(e.to_string()))?;

        if value.is_null() {
            return Ok(None);
        }
        if let Some(dir) = &self.record_dir {
            self.save_recording(dir, signature, &value);
        }

        Ok(Some(TransactionRecord::from_json(&value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_config() {
        let config = InspectorConfig::default().with_encoding(UiTransactionEncoding::Json);
        let source = RpcTransactionSource::new(&config);
        let tx_config = source.transaction_config();
        assert_eq!(tx_config.encoding, Some(UiTransactionEncoding::Json));
        assert_eq!(tx_config.max_supported_transaction_version, Some(0));
        let value = serde_json::to_value(&tx_config).unwrap();
        assert_eq!(value["maxSupportedTransactionVersion"], 0);
        assert_eq!(value["commitment"], "confirmed");
    }

    #[test]
    fn test_save_recording() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let config = InspectorConfig::default()
            .with_record_dir(Some(temp_dir.path().to_path_buf()));
        let source = RpcTransactionSource::new(&config);
        let value = json!({ "slot": 7 });
        source.save_recording(temp_dir.path(), "abc", &value);

        let content = fs::read_to_string(temp_dir.path().join("abc.json")).unwrap();
        let loaded: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK").is_ok());
        assert!(matches!(parse_address("not-a-key"), Err(FetchError::InvalidAddress(_))));
    }
}
