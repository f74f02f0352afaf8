//! 交易检查报告 - 分类、解码结果与余额变化

use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use super::classifier::InstructionKind;
use super::instruction_decoder::{DecodedInstruction, InstructionDepth};
use super::log_parser::LiquidityLogInfo;
use super::types::TransactionRecord;
use super::utils::{format_token_amount, serialize_pubkey};
use crate::constants::tokens::known_symbol;

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// lamports 转换为 SOL
pub fn lamports_to_sol(lamports: i128) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

/// 单条指令的检查结果
#[derive(Debug, Clone, Serialize)]
pub struct InstructionReport {
    /// 顶层指令索引
    pub index: usize,
    /// 内部指令索引（顶层指令为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_index: Option<usize>,
    pub depth: InstructionDepth,
    #[serde(serialize_with = "serialize_pubkey")]
    pub program_id: Pubkey,
    /// 解码所依据的分类
    pub kind: InstructionKind,
    /// 原始数据（hex）
    pub data_hex: String,
    /// 无法解码为字节的原始数据字符串
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
    /// 指令账户（按索引解析为地址）
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<String>,
    /// 节点已解析的指令内容
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<DecodedInstruction>,
    /// 解码失败的原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstructionReport {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    fn position(&self) -> String {
        match self.inner_index {
            Some(inner) => format!("{}.{}", self.index, inner),
            None => self.index.to_string(),
        }
    }
}

/// SOL 余额变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolBalanceChange {
    pub account_index: usize,
    #[serde(serialize_with = "serialize_pubkey")]
    pub account: Pubkey,
    pub pre: u64,
    pub post: u64,
    pub change: i128,
}

/// 代币余额变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenBalanceChange {
    pub account_index: usize,
    #[serde(serialize_with = "serialize_pubkey")]
    pub mint: Pubkey,
    pub pre: u64,
    pub post: u64,
    pub change: i128,
    pub decimals: u8,
}

impl TokenBalanceChange {
    pub fn ui_change(&self) -> f64 {
        let ui = format_token_amount(self.change.unsigned_abs() as u64, self.decimals);
        if self.change < 0 { -ui } else { ui }
    }
}

/// 计算 SOL 余额变化，只保留非零变化
pub fn sol_balance_changes(record: &TransactionRecord) -> Vec<SolBalanceChange> {
    record
        .pre_balances
        .iter()
        .zip(record.post_balances.iter())
        .enumerate()
        .filter(|(_, (pre, post))| pre != post)
        .map(|(account_index, (pre, post))| SolBalanceChange {
            account_index,
            account: record.account_keys.get(account_index).copied().unwrap_or_default(),
            pre: *pre,
            post: *post,
            change: *post as i128 - *pre as i128,
        })
        .collect()
}

/// 计算代币余额变化
///
/// 按账户索引和 mint 同时匹配前后余额；交易中被关闭的账户只有 pre 记录，post 视为 0
pub fn token_balance_changes(record: &TransactionRecord) -> Vec<TokenBalanceChange> {
    let mut changes = Vec::new();

    for post in &record.post_token_balances {
        let pre_amount = record
            .pre_token_balances
            .iter()
            .find(|pre| pre.account_index == post.account_index && pre.mint == post.mint)
            .map(|pre| pre.amount)
            .unwrap_or_default();
        if pre_amount != post.amount {
            changes.push(TokenBalanceChange {
                account_index: post.account_index,
                mint: post.mint,
                pre: pre_amount,
                post: post.amount,
                change: post.amount as i128 - pre_amount as i128,
                decimals: post.decimals,
            });
        }
    }

    for pre in &record.pre_token_balances {
        let closed = !record
            .post_token_balances
            .iter()
            .any(|post| post.account_index == pre.account_index && post.mint == pre.mint);
        if closed && pre.amount != 0 {
            changes.push(TokenBalanceChange {
                account_index: pre.account_index,
                mint: pre.mint,
                pre: pre.amount,
                post: 0,
                change: -(pre.amount as i128),
                decimals: pre.decimals,
            });
        }
    }

    changes
}

/// 单笔交易的检查报告
#[derive(Debug, Clone, Serialize)]
pub struct TransactionReport {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    pub fee: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
    /// 交易级别分类（最后匹配获胜）
    pub kind: InstructionKind,
    /// 按顶层指令切分后的分类
    pub segment_kinds: Vec<InstructionKind>,
    pub instructions: Vec<InstructionReport>,
    pub sol_changes: Vec<SolBalanceChange>,
    pub token_changes: Vec<TokenBalanceChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<LiquidityLogInfo>,
}

impl TransactionReport {
    /// 成功解码的指令
    pub fn decoded(&self) -> impl Iterator<Item = &DecodedInstruction> {
        self.instructions.iter().filter_map(|ix| ix.decoded.as_ref())
    }

    pub fn decoded_count(&self) -> usize {
        self.decoded().count()
    }

    pub fn failed_count(&self) -> usize {
        self.instructions.iter().filter(|ix| ix.is_failed()).count()
    }

    pub fn block_time_display(&self) -> String {
        self.block_time
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// 以结构化日志输出报告
    pub fn log(&self, record: &TransactionRecord) {
        let status = if self.success { "Success" } else { "Failed" };
        info!(
            signature = %self.signature,
            slot = self.slot,
            time = %self.block_time_display(),
            kind = %self.kind,
            status,
            fee = self.fee,
            "=== 交易详情 ==="
        );
        if let Some(signer) = &self.signer {
            info!("签名者: {}", signer);
        }
        if let Some(err) = &self.err {
            info!("错误: {}", err);
        }
        for (index, line) in record.log_messages.iter().enumerate() {
            debug!("  日志[{}] {}", index, line);
        }
        for (index, account) in record.account_keys.iter().enumerate() {
            debug!("  账户[{}] {}", index, account);
        }

        if !self.token_changes.is_empty() {
            info!("代币余额变化:");
            for change in &self.token_changes {
                let label = known_symbol(&change.mint)
                    .map(str::to_string)
                    .unwrap_or_else(|| change.mint.to_string());
                info!(
                    "  账户[{}] {}: {} -> {} (变化: {}, {:+})",
                    change.account_index,
                    label,
                    change.pre,
                    change.post,
                    change.change,
                    change.ui_change()
                );
            }
        }

        if !self.sol_changes.is_empty() {
            info!("SOL 余额变化:");
            for change in &self.sol_changes {
                info!(
                    "  账户[{}] {} SOL -> {} SOL (变化: {} SOL)",
                    change.account_index,
                    lamports_to_sol(change.pre as i128),
                    lamports_to_sol(change.post as i128),
                    lamports_to_sol(change.change)
                );
            }
        }

        if let Some(liquidity) = &self.liquidity {
            info!("流动性日志: {:?}", liquidity);
        }

        for ix in &self.instructions {
            if let Some(decoded) = &ix.decoded {
                let fields = serde_json::to_string(decoded).unwrap_or_default();
                info!("  指令[{}] {} {} {}", ix.position(), ix.program_id, decoded.name(), fields);
                if matches!(decoded, DecodedInstruction::CreateMetadataAccountV3(_)) {
                    info!("    账户: {}", ix.accounts.join(", "));
                } else if !ix.accounts.is_empty() {
                    debug!("    账户: {}", ix.accounts.join(", "));
                }
            } else if let Some(raw) = &ix.raw_data {
                info!("  指令[{}] {} 数据无法解码: {}", ix.position(), ix.program_id, raw);
            } else if let Some(error) = &ix.error {
                info!("  指令[{}] {} 解码失败: {}", ix.position(), ix.program_id, error);
            } else if let Some(parsed) = &ix.parsed {
                debug!("  指令[{}] {} 已解析: {}", ix.position(), ix.program_id, parsed);
            } else {
                debug!("  指令[{}] {} 未解码, data: {}", ix.position(), ix.program_id, ix.data_hex);
            }
        }
    }
}
