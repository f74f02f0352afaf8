//! 测试辅助工具
//!
//! 构造 getTransaction 形状的 JSON（json / jsonParsed 两种编码）以及常用的指令数据

#![allow(dead_code)]

use clmm_tx_decoder::common::MockTransactionSource;
use clmm_tx_decoder::constants::{COMPUTE_BUDGET_PROGRAM_ID, RAYDIUM_CLMM_PROGRAM_ID};
use clmm_tx_decoder::constants::discriminators::raydium_clmm;
use clmm_tx_decoder::parser::raydium::SwapV2;
use clmm_tx_decoder::parser::{InstructionLayout, SignatureInfo, TransactionRecord};
use serde_json::{Value, json};
use solana_sdk::pubkey::Pubkey;

pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// 交易中使用的账户
#[derive(Debug, Clone, Copy)]
pub struct SwapAccounts {
    pub payer: Pubkey,
    pub pool: Pubkey,
    pub user_token: Pubkey,
    pub mint: Pubkey,
    /// 地址表加载的只读账户
    pub lookup: Pubkey,
}

impl SwapAccounts {
    pub fn new() -> Self {
        Self {
            payer: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            user_token: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            lookup: Pubkey::new_unique(),
        }
    }

    /// 静态账户列表：payer, pool, user_token, ComputeBudget, CLMM, Token
    pub fn static_keys(&self) -> Vec<String> {
        vec![
            self.payer.to_string(),
            self.pool.to_string(),
            self.user_token.to_string(),
            COMPUTE_BUDGET_PROGRAM_ID.to_string(),
            RAYDIUM_CLMM_PROGRAM_ID.to_string(),
            TOKEN_PROGRAM.to_string(),
        ]
    }
}

pub fn compute_unit_limit_data(units: u32) -> Vec<u8> {
    let mut data = vec![2];
    data.extend_from_slice(&units.to_le_bytes());
    data
}

pub fn compute_unit_price_data(micro_lamports: u64) -> Vec<u8> {
    let mut data = vec![3];
    data.extend_from_slice(&micro_lamports.to_le_bytes());
    data
}

pub fn swap_v2(amount: u64, other_amount_threshold: u64) -> SwapV2 {
    SwapV2 {
        discriminator: u64::from_le_bytes(raydium_clmm::SWAP_V2),
        amount,
        other_amount_threshold,
        sqrt_price_limit_x64: 0,
        is_base_input: true,
        padding: 0,
    }
}

pub fn swap_v2_data(amount: u64, other_amount_threshold: u64) -> Vec<u8> {
    swap_v2(amount, other_amount_threshold).encode()
}

/// 三条顶层指令（限额、单价、SwapV2）对应的日志
pub fn swap_logs() -> Vec<String> {
    let cb = COMPUTE_BUDGET_PROGRAM_ID.to_string();
    let clmm = RAYDIUM_CLMM_PROGRAM_ID.to_string();
    vec![
        format!("Program {cb} invoke [1]"),
        format!("Program {cb} success"),
        format!("Program {cb} invoke [1]"),
        format!("Program {cb} success"),
        format!("Program {clmm} invoke [1]"),
        "Program log: Instruction: SwapV2".to_string(),
        format!("Program {TOKEN_PROGRAM} invoke [2]"),
        "Program log: Instruction: TransferChecked".to_string(),
        format!("Program {TOKEN_PROGRAM} success"),
        format!("Program {clmm} consumed 80000 of 200000 compute units"),
        format!("Program {clmm} success"),
    ]
}

/// 内部转账指令的数据（TransferChecked，tag 12）
pub fn transfer_checked_data() -> Vec<u8> {
    let mut data = vec![12];
    data.extend_from_slice(&1_000_000u64.to_le_bytes());
    data.push(6);
    data
}

fn token_balance(accounts: &SwapAccounts, amount: u64) -> Value {
    json!({
        "accountIndex": 2,
        "mint": accounts.mint.to_string(),
        "owner": accounts.payer.to_string(),
        "programId": TOKEN_PROGRAM,
        "uiTokenAmount": {
            "amount": amount.to_string(),
            "decimals": 6,
            "uiAmount": amount as f64 / 1_000_000.0,
            "uiAmountString": (amount as f64 / 1_000_000.0).to_string(),
        }
    })
}

fn meta(accounts: &SwapAccounts, inner: Value, loaded: Value) -> Value {
    json!({
        "err": null,
        "status": { "Ok": null },
        "fee": 5000,
        "preBalances": [2_000_000_000u64, 10_000_000u64, 2_039_280u64, 1, 1, 1],
        "postBalances": [1_999_995_000u64, 10_000_000u64, 2_039_280u64, 1, 1, 1],
        "innerInstructions": [{ "index": 2, "instructions": inner }],
        "logMessages": swap_logs(),
        "preTokenBalances": [token_balance(accounts, 0)],
        "postTokenBalances": [token_balance(accounts, 1_000_000)],
        "loadedAddresses": loaded,
        "computeUnitsConsumed": 80000,
    })
}

/// `encoding: json` 形状的 SwapV2 交易（编译格式，账户为索引，数据为 base58）
pub fn swap_tx_json(accounts: &SwapAccounts, signature: &str, slot: u64) -> Value {
    json!({
        "slot": slot,
        "blockTime": 1_700_000_000,
        "version": 0,
        "transaction": {
            "signatures": [signature],
            "message": {
                "header": {
                    "numRequiredSignatures": 1,
                    "numReadonlySignedAccounts": 0,
                    "numReadonlyUnsignedAccounts": 3,
                },
                "accountKeys": accounts.static_keys(),
                "recentBlockhash": Pubkey::new_unique().to_string(),
                "instructions": [
                    {
                        "programIdIndex": 3,
                        "accounts": [],
                        "data": bs58::encode(compute_unit_limit_data(200_000)).into_string(),
                        "stackHeight": null,
                    },
                    {
                        "programIdIndex": 3,
                        "accounts": [],
                        "data": bs58::encode(compute_unit_price_data(1_000_000)).into_string(),
                        "stackHeight": null,
                    },
                    {
                        "programIdIndex": 4,
                        "accounts": [0, 1, 2, 6],
                        "data": bs58::encode(swap_v2_data(1_000_000, 990_000)).into_string(),
                        "stackHeight": null,
                    },
                ],
                "addressTableLookups": [{
                    "accountKey": Pubkey::new_unique().to_string(),
                    "writableIndexes": [],
                    "readonlyIndexes": [0],
                }],
            }
        },
        "meta": meta(
            accounts,
            json!([{
                "programIdIndex": 5,
                "accounts": [2, 1, 0],
                "data": bs58::encode(transfer_checked_data()).into_string(),
                "stackHeight": 2,
            }]),
            json!({ "writable": [], "readonly": [accounts.lookup.to_string()] }),
        ),
    })
}

/// `encoding: jsonParsed` 形状的同一笔交易
///
/// 账户列表为对象并已包含地址表账户，指令使用 programId 与账户字符串。
/// 内部转账保持未解析形式，使两种编码得到相同的记录。
pub fn swap_tx_json_parsed(accounts: &SwapAccounts, signature: &str, slot: u64) -> Value {
    let mut keys: Vec<Value> = accounts
        .static_keys()
        .into_iter()
        .enumerate()
        .map(|(i, key)| {
            json!({ "pubkey": key, "signer": i == 0, "writable": i < 3, "source": "transaction" })
        })
        .collect();
    keys.push(json!({
        "pubkey": accounts.lookup.to_string(),
        "signer": false,
        "writable": false,
        "source": "lookupTable",
    }));

    let cb = COMPUTE_BUDGET_PROGRAM_ID.to_string();
    json!({
        "slot": slot,
        "blockTime": 1_700_000_000,
        "version": 0,
        "transaction": {
            "signatures": [signature],
            "message": {
                "accountKeys": keys,
                "recentBlockhash": Pubkey::new_unique().to_string(),
                "instructions": [
                    {
                        "programId": cb,
                        "accounts": [],
                        "data": bs58::encode(compute_unit_limit_data(200_000)).into_string(),
                        "stackHeight": null,
                    },
                    {
                        "programId": cb,
                        "accounts": [],
                        "data": bs58::encode(compute_unit_price_data(1_000_000)).into_string(),
                        "stackHeight": null,
                    },
                    {
                        "programId": RAYDIUM_CLMM_PROGRAM_ID.to_string(),
                        "accounts": [
                            accounts.payer.to_string(),
                            accounts.pool.to_string(),
                            accounts.user_token.to_string(),
                            accounts.lookup.to_string(),
                        ],
                        "data": bs58::encode(swap_v2_data(1_000_000, 990_000)).into_string(),
                        "stackHeight": null,
                    },
                ],
            }
        },
        "meta": meta(
            accounts,
            json!([{
                "programId": TOKEN_PROGRAM,
                "accounts": [
                    accounts.user_token.to_string(),
                    accounts.pool.to_string(),
                    accounts.payer.to_string(),
                ],
                "data": bs58::encode(transfer_checked_data()).into_string(),
                "stackHeight": 2,
            }]),
            json!({ "writable": [], "readonly": [accounts.lookup.to_string()] }),
        ),
    })
}

/// 从 json 编码构造 SwapV2 交易记录
pub fn swap_record(signature: &str, slot: u64) -> TransactionRecord {
    let value = swap_tx_json(&SwapAccounts::new(), signature, slot);
    TransactionRecord::from_json(&value).expect("构造交易记录失败")
}

/// 一个 Mock 数据源，历史中有 `count` 笔 SwapV2 交易（sig-0 最新）
pub fn mock_history(count: usize) -> MockTransactionSource {
    let source = MockTransactionSource::new();
    for i in 0..count {
        source.push_transaction(swap_record(&format!("sig-{i}"), 1_000 - i as u64));
    }
    source
}

pub fn signature_info(signature: &str, slot: u64, err: Option<&str>) -> SignatureInfo {
    SignatureInfo {
        signature: signature.to_string(),
        slot,
        err: err.map(str::to_string),
        block_time: Some(1_700_000_000),
    }
}
