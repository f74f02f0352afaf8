//! Mock 数据源
//!
//! 内存中的签名历史（按时间倒序）+ 交易内容，支持：
//! - 真实的 before / until / limit 分页语义
//! - 按页或按签名注入失败
//! - 记录每次请求，便于断言请求次数与游标
//! - 从录制目录（`<signature>.json`）重放

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::rpc_client_wrapper::{FetchError, SignatureQuery, TransactionSource};
use crate::parser::types::{SignatureInfo, TransactionRecord};

#[derive(Default)]
struct MockState {
    slot: u64,
    slot_error: Option<FetchError>,
    /// 最新的在前
    history: Vec<SignatureInfo>,
    transactions: HashMap<String, TransactionRecord>,
    /// 第 n 次（从 1 开始）签名分页请求失败
    failing_pages: HashSet<usize>,
    failing_transactions: HashSet<String>,
    signature_queries: Vec<SignatureQuery>,
    transaction_requests: Vec<String>,
}

/// 内存 Mock 数据源
#[derive(Default)]
pub struct MockTransactionSource {
    state: Mutex<MockState>,
}

impl MockTransactionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一笔交易：签名加入历史末尾（更早），内容可被 get_transaction 获取
    pub fn push_transaction(&self, record: TransactionRecord) {
        let mut state = self.state.lock();
        state.slot = state.slot.max(record.slot);
        state.history.push(SignatureInfo {
            signature: record.signature.clone(),
            slot: record.slot,
            err: record.err.clone(),
            block_time: record.block_time,
        });
        state.transactions.insert(record.signature.clone(), record);
    }

    /// 只追加签名，不提供交易内容（get_transaction 返回 None）
    pub fn push_signature(&self, info: SignatureInfo) {
        self.state.lock().history.push(info);
    }

    /// 让第 `request_number` 次签名分页请求失败（从 1 开始计数）
    pub fn fail_page(&self, request_number: usize) {
        self.state.lock().failing_pages.insert(request_number);
    }

    pub fn fail_transaction(&self, signature: &str) {
        self.state.lock().failing_transactions.insert(signature.to_string());
    }

    pub fn fail_slot(&self, error: FetchError) {
        self.state.lock().slot_error = Some(error);
    }

    pub fn signature_request_count(&self) -> usize {
        self.state.lock().signature_queries.len()
    }

    pub fn signature_queries(&self) -> Vec<SignatureQuery> {
        self.state.lock().signature_queries.clone()
    }

    pub fn transaction_request_count(&self) -> usize {
        self.state.lock().transaction_requests.len()
    }

    pub fn transaction_requests(&self) -> Vec<String> {
        self.state.lock().transaction_requests.clone()
    }

    /// 从录制目录加载所有 `*.json` 交易，按 slot 倒序排列为签名历史
    pub fn from_fixture_dir(dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir)
            .map_err(|e| FetchError::Fixture(format!("无法读取目录 {:?}: {}", dir, e)))?;

        let mut records = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| FetchError::Fixture(e.to_string()))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)
                .map_err(|e| FetchError::Fixture(format!("{:?}: {}", path, e)))?;
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| FetchError::Fixture(format!("解析失败 {:?}: {}", path, e)))?;
            let record = TransactionRecord::from_json(&value)
                .map_err(|e| FetchError::Fixture(format!("{:?}: {}", path, e)))?;
            records.push(record);
        }

        records.sort_by(|a, b| b.slot.cmp(&a.slot).then_with(|| a.signature.cmp(&b.signature)));

        let source = Self::new();
        for record in records {
            source.push_transaction(record);
        }
        Ok(source)
    }
}

#[async_trait]
impl TransactionSource for MockTransactionSource {
    async fn get_slot(&self) -> Result<u64, FetchError> {
        let state = self.state.lock();
        match &state.slot_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.slot),
        }
    }

    async fn get_signatures_for_address(
        &self,
        _address: &Pubkey,
        query: &SignatureQuery,
    ) -> Result<Vec<SignatureInfo>, FetchError> {
        let mut state = self.state.lock();
        state.signature_queries.push(query.clone());
        let request_number = state.signature_queries.len();
        if state.failing_pages.contains(&request_number) {
            return Err(FetchError::Rpc(format!("injected failure on page request {request_number}")));
        }

        let start = match &query.before {
            Some(before) => match state.history.iter().position(|s| &s.signature == before) {
                Some(pos) => pos + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };

        Ok(state.history[start..]
            .iter()
            .take_while(|s| query.until.as_deref() != Some(s.signature.as_str()))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, FetchError> {
        let mut state = self.state.lock();
        state.transaction_requests.push(signature.to_string());
        if state.failing_transactions.contains(signature) {
            return Err(FetchError::Rpc(format!("injected failure for {signature}")));
        }
        Ok(state.transactions.get(signature).cloned())
    }
}
