//! 交易记录的核心数据类型定义

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// 原始指令
///
/// `accounts` 是交易账户列表中的索引；`jsonParsed` 编码下节点已解析的指令没有原始数据，
/// 其内容保存在 `parsed` 中
#[derive(Debug, Clone, PartialEq)]
pub struct RawInstruction {
    /// 程序ID
    pub program_id: Pubkey,
    /// 指令数据
    pub data: Vec<u8>,
    /// 账户索引列表
    pub accounts: Vec<usize>,
    /// 节点已解析的指令 JSON
    pub parsed: Option<serde_json::Value>,
    /// 调用栈深度（顶层为 1）
    pub stack_height: Option<u32>,
    /// base58 与 base64 都无法解码时保留的原始字符串
    pub undecoded_data: Option<String>,
}

impl RawInstruction {
    pub fn new(program_id: Pubkey, data: Vec<u8>, accounts: Vec<usize>) -> Self {
        Self { program_id, data, accounts, parsed: None, stack_height: None, undecoded_data: None }
    }

    /// 是否为节点已解析的指令（没有原始数据可解码）
    pub fn is_parsed(&self) -> bool {
        self.parsed.is_some()
    }
}

/// 某条顶层指令下的内部指令集合
#[derive(Debug, Clone, PartialEq)]
pub struct InnerInstructionSet {
    /// 顶层指令索引
    pub index: usize,
    pub instructions: Vec<RawInstruction>,
}

/// 代币余额快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub account_index: usize,
    pub mint: Pubkey,
    /// 原始数量（未处理精度）
    pub amount: u64,
    pub decimals: u8,
}

/// 已确认交易的完整记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    /// 交易签名
    pub signature: String,
    /// 区块槽位
    pub slot: u64,
    /// 区块时间（unix 秒）
    pub block_time: Option<i64>,
    /// 手续费（lamports）
    pub fee: u64,
    /// 执行错误，成功时为 None
    pub err: Option<String>,
    /// 账户列表：静态账户 + 地址表加载的可写账户 + 只读账户
    pub account_keys: Vec<Pubkey>,
    pub log_messages: Vec<String>,
    pub instructions: Vec<RawInstruction>,
    pub inner_instructions: Vec<InnerInstructionSet>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub pre_token_balances: Vec<TokenBalance>,
    pub post_token_balances: Vec<TokenBalance>,
}

impl TransactionRecord {
    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }

    /// 费用支付者（第一个账户）
    pub fn signer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    /// 获取指定顶层指令下的内部指令
    pub fn inner_instructions_for(&self, index: usize) -> &[RawInstruction] {
        self.inner_instructions
            .iter()
            .find(|set| set.index == index)
            .map(|set| set.instructions.as_slice())
            .unwrap_or_default()
    }

    /// 将账户索引解析为公钥，越界的索引被忽略
    pub fn resolve_accounts(&self, instruction: &RawInstruction) -> Vec<Pubkey> {
        instruction
            .accounts
            .iter()
            .filter_map(|idx| self.account_keys.get(*idx).copied())
            .collect()
    }

    /// 内部指令总数
    pub fn inner_instruction_count(&self) -> usize {
        self.inner_instructions.iter().map(|set| set.instructions.len()).sum()
    }
}

/// 签名历史中的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub err: Option<String>,
    pub block_time: Option<i64>,
}

impl SignatureInfo {
    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_instructions_for() {
        let program = Pubkey::new_unique();
        let record = TransactionRecord {
            inner_instructions: vec![InnerInstructionSet {
                index: 2,
                instructions: vec![RawInstruction::new(program, vec![1], vec![])],
            }],
            ..Default::default()
        };
        assert_eq!(record.inner_instructions_for(2).len(), 1);
        assert!(record.inner_instructions_for(0).is_empty());
        assert_eq!(record.inner_instruction_count(), 1);
    }

    #[test]
    fn test_resolve_accounts_skips_out_of_range() {
        let keys = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        let record = TransactionRecord { account_keys: keys.clone(), ..Default::default() };
        let ix = RawInstruction::new(Pubkey::new_unique(), vec![], vec![1, 0, 7]);
        assert_eq!(record.resolve_accounts(&ix), vec![keys[1], keys[0]]);
        assert_eq!(record.signer(), Some(&keys[0]));
    }
}
