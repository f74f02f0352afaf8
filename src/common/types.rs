use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_transaction_status::UiTransactionEncoding;
use std::path::PathBuf;

use crate::constants::programs::DEFAULT_CLMM_PROGRAM_IDS;
use crate::parser::classifier::ClassificationMode;

/// Inspector configuration
///
/// Shared by the RPC source (endpoint, commitment, encoding, recording) and the decoder
/// (which programs are treated as CLMM, how transactions are classified).
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    /// getTransaction 编码，`jsonParsed`（默认）或 `json`
    pub encoding: UiTransactionEncoding,
    /// 视为 CLMM 的程序；为空时除内置程序外的所有程序都尝试解码
    pub clmm_program_ids: Vec<Pubkey>,
    pub classification_mode: ClassificationMode,
    /// 设置后每笔获取到的交易原始 JSON 写入 `<dir>/<signature>.json`
    pub record_dir: Option<PathBuf>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8899".to_string(),
            commitment: CommitmentConfig::confirmed(),
            encoding: UiTransactionEncoding::JsonParsed,
            clmm_program_ids: DEFAULT_CLMM_PROGRAM_IDS.to_vec(),
            classification_mode: ClassificationMode::Transaction,
            record_dir: None,
        }
    }
}

impl InspectorConfig {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self { rpc_url, commitment, ..Default::default() }
    }

    pub fn with_clmm_program_ids(mut self, clmm_program_ids: Vec<Pubkey>) -> Self {
        self.clmm_program_ids = clmm_program_ids;
        self
    }

    pub fn with_encoding(mut self, encoding: UiTransactionEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// 设置分类模式
    pub fn with_classification_mode(mut self, mode: ClassificationMode) -> Self {
        self.classification_mode = mode;
        self
    }

    pub fn with_record_dir(mut self, record_dir: Option<PathBuf>) -> Self {
        self.record_dir = record_dir;
        self
    }
}

pub type SolanaRpcClient = solana_client::nonblocking::rpc_client::RpcClient;
pub type AnyResult<T> = anyhow::Result<T>;
