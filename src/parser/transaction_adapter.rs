//! 交易适配器 - 将 getTransaction 的 JSON 结果转换为 TransactionRecord
//!
//! 同时支持 `json` 与 `jsonParsed` 两种编码：
//! - 账户列表既可能是字符串数组，也可能是 `{pubkey, signer, writable, source}` 对象数组
//! - 指令既可能是编译格式（`programIdIndex` + 账户索引），也可能是部分解析格式（`programId` + 账户字符串）
//! - `json` 编码下地址表加载的账户位于 `meta.loadedAddresses`，需要追加到账户列表末尾

use base64::Engine;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use solana_transaction_status::EncodedConfirmedTransactionWithStatusMeta;
use std::str::FromStr;
use tracing::warn;

use super::types::{InnerInstructionSet, RawInstruction, TokenBalance, TransactionRecord};

/// 交易适配器错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("交易数据无效: {0}")]
    InvalidTransactionData(String),
    #[error("缺少字段: {0}")]
    MissingField(&'static str),
    #[error("Pubkey 解析失败 ({field}): {value}")]
    PubkeyParseError { field: &'static str, value: String },
    #[error("JSON 解析失败: {0}")]
    JsonError(String),
}

impl TransactionRecord {
    /// 从 EncodedConfirmedTransactionWithStatusMeta 创建交易记录
    pub fn from_encoded_transaction(
        encoded_tx: &EncodedConfirmedTransactionWithStatusMeta,
    ) -> Result<Self, AdapterError> {
        // 使用 JSON 序列化来避免复杂的类型匹配
        let tx_value =
            serde_json::to_value(encoded_tx).map_err(|e| AdapterError::JsonError(e.to_string()))?;
        Self::from_json(&tx_value)
    }

    /// 从 getTransaction 的 JSON 结果创建交易记录
    pub fn from_json(tx_value: &Value) -> Result<Self, AdapterError> {
        if !tx_value.is_object() {
            return Err(AdapterError::InvalidTransactionData("顶层不是 JSON 对象".to_string()));
        }
        let message = &tx_value["transaction"]["message"];
        if !message.is_object() {
            return Err(AdapterError::MissingField("transaction.message"));
        }
        let meta = &tx_value["meta"];

        let signature = tx_value["transaction"]["signatures"]
            .as_array()
            .and_then(|sigs| sigs.first())
            .and_then(|sig| sig.as_str())
            .ok_or(AdapterError::MissingField("transaction.signatures"))?
            .to_string();

        let account_keys = extract_account_keys(message, meta)?;
        let instructions = match message["instructions"].as_array() {
            Some(ixs) => ixs
                .iter()
                .enumerate()
                .map(|(idx, ix)| parse_instruction(ix, &account_keys, idx))
                .collect::<Result<Vec<_>, _>>()?,
            None => return Err(AdapterError::MissingField("transaction.message.instructions")),
        };
        let inner_instructions = extract_inner_instructions(meta, &account_keys)?;

        Ok(Self {
            signature,
            slot: tx_value["slot"].as_u64().unwrap_or_default(),
            block_time: tx_value["blockTime"].as_i64(),
            fee: meta["fee"].as_u64().unwrap_or_default(),
            err: match &meta["err"] {
                Value::Null => None,
                err => Some(err.to_string()),
            },
            log_messages: meta["logMessages"]
                .as_array()
                .map(|logs| logs.iter().filter_map(|l| l.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            pre_balances: extract_u64_array(&meta["preBalances"]),
            post_balances: extract_u64_array(&meta["postBalances"]),
            pre_token_balances: extract_token_balances(&meta["preTokenBalances"])?,
            post_token_balances: extract_token_balances(&meta["postTokenBalances"])?,
            account_keys,
            instructions,
            inner_instructions,
        })
    }
}

fn parse_pubkey(value: &str, field: &'static str) -> Result<Pubkey, AdapterError> {
    Pubkey::from_str(value)
        .map_err(|_| AdapterError::PubkeyParseError { field, value: value.to_string() })
}

/// 提取账户密钥
fn extract_account_keys(message: &Value, meta: &Value) -> Result<Vec<Pubkey>, AdapterError> {
    let raw_keys = message["accountKeys"]
        .as_array()
        .or_else(|| message["staticAccountKeys"].as_array())
        .ok_or(AdapterError::MissingField("transaction.message.accountKeys"))?;

    let mut keys = Vec::with_capacity(raw_keys.len());
    let mut parsed_form = false;
    for key_value in raw_keys {
        // 字符串（json）或带 pubkey 字段的对象（jsonParsed）
        let key_str = if let Some(key_str) = key_value.as_str() {
            key_str
        } else if let Some(key_str) = key_value["pubkey"].as_str() {
            parsed_form = true;
            key_str
        } else {
            return Err(AdapterError::InvalidTransactionData(format!(
                "无法识别的账户格式: {key_value}"
            )));
        };
        keys.push(parse_pubkey(key_str, "accountKeys")?);
    }

    // jsonParsed 的账户列表已包含地址表账户
    if !parsed_form {
        for field in ["writable", "readonly"] {
            if let Some(loaded) = meta["loadedAddresses"][field].as_array() {
                for addr in loaded.iter().filter_map(|a| a.as_str()) {
                    keys.push(parse_pubkey(addr, "loadedAddresses")?);
                }
            }
        }
    }

    Ok(keys)
}

/// 解析指令数据：base58 优先，失败时尝试 base64
fn decode_instruction_data(data_str: &str) -> Result<Vec<u8>, base64::DecodeError> {
    bs58::decode(data_str)
        .into_vec()
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(data_str))
}

/// 解析单条指令（顶层或内部）
fn parse_instruction(
    ix_value: &Value,
    account_keys: &[Pubkey],
    idx: usize,
) -> Result<RawInstruction, AdapterError> {
    // 编译格式使用 programIdIndex，解析格式使用 programId 字符串
    let program_id = if let Some(program_id_index) = ix_value["programIdIndex"].as_u64() {
        *account_keys.get(program_id_index as usize).ok_or_else(|| {
            AdapterError::InvalidTransactionData(format!(
                "指令 {idx} 的 programIdIndex {program_id_index} 越界"
            ))
        })?
    } else if let Some(program_id_str) = ix_value["programId"].as_str() {
        parse_pubkey(program_id_str, "programId")?
    } else {
        return Err(AdapterError::MissingField("instruction.programId"));
    };

    let stack_height = ix_value["stackHeight"].as_u64().map(|h| h as u32);

    // 节点已解析的指令（system / spl-token 等）
    if ix_value.get("parsed").is_some() {
        return Ok(RawInstruction {
            program_id,
            data: Vec::new(),
            accounts: Vec::new(),
            parsed: Some(ix_value["parsed"].clone()),
            stack_height,
            undecoded_data: None,
        });
    }

    let accounts = ix_value["accounts"]
        .as_array()
        .map(|accounts_arr| {
            accounts_arr
                .iter()
                .filter_map(|acc| {
                    if let Some(index) = acc.as_u64() {
                        Some(index as usize)
                    } else if let Some(acc_str) = acc.as_str() {
                        // 账户字符串映射回索引
                        let pubkey = Pubkey::from_str(acc_str).ok()?;
                        account_keys.iter().position(|k| *k == pubkey)
                    } else {
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let (data, undecoded_data) = match ix_value["data"].as_str() {
        Some(data_str) => match decode_instruction_data(data_str) {
            Ok(data) => (data, None),
            Err(e) => {
                warn!("指令数据解析失败 (指令索引 {}): {} (data: {})", idx, e, data_str);
                (Vec::new(), Some(data_str.to_string()))
            }
        },
        None => (Vec::new(), None),
    };

    Ok(RawInstruction { program_id, data, accounts, parsed: None, stack_height, undecoded_data })
}

/// 提取内部指令
fn extract_inner_instructions(
    meta: &Value,
    account_keys: &[Pubkey],
) -> Result<Vec<InnerInstructionSet>, AdapterError> {
    let Some(inner_sets) = meta["innerInstructions"].as_array() else {
        return Ok(Vec::new());
    };

    inner_sets
        .iter()
        .map(|inner_set| {
            let index = inner_set["index"]
                .as_u64()
                .ok_or(AdapterError::MissingField("innerInstructions.index"))?
                as usize;
            let instructions = inner_set["instructions"]
                .as_array()
                .map(|ixs| {
                    ixs.iter()
                        .map(|ix| parse_instruction(ix, account_keys, index))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?
                .unwrap_or_default();
            Ok(InnerInstructionSet { index, instructions })
        })
        .collect()
}

fn extract_u64_array(value: &Value) -> Vec<u64> {
    value
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_u64()).collect())
        .unwrap_or_default()
}

/// 提取代币余额
fn extract_token_balances(value: &Value) -> Result<Vec<TokenBalance>, AdapterError> {
    let Some(balances) = value.as_array() else {
        return Ok(Vec::new());
    };

    let mut result = Vec::with_capacity(balances.len());
    for balance in balances {
        let Some(account_index) = balance["accountIndex"].as_u64() else {
            continue;
        };
        let Some(mint_str) = balance["mint"].as_str() else {
            continue;
        };
        let ui_amount = &balance["uiTokenAmount"];
        let amount = ui_amount["amount"]
            .as_str()
            .and_then(|a| a.parse::<u64>().ok())
            .unwrap_or_default();
        result.push(TokenBalance {
            account_index: account_index as usize,
            mint: parse_pubkey(mint_str, "tokenBalances.mint")?,
            amount,
            decimals: ui_amount["decimals"].as_u64().unwrap_or_default() as u8,
        });
    }
    Ok(result)
}
