//! 程序地址常量

use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

/// Raydium CLMM 主网程序
pub const RAYDIUM_CLMM_PROGRAM_ID: Pubkey = pubkey!("CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK");

/// Raydium CLMM devnet 程序
pub const RAYDIUM_CLMM_DEVNET_PROGRAM_ID: Pubkey =
    pubkey!("devi51mZmdwUJGU9hjN27vEz64Gps7uUefqxg27EAtH");

/// Compute Budget 程序
pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey =
    pubkey!("ComputeBudget111111111111111111111111111111");

/// Metaplex Token Metadata 程序
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

pub const MEMO_PROGRAM_ID: Pubkey = pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

pub const MEMO_V1_PROGRAM_ID: Pubkey = pubkey!("Memo1UhkJRfHyvLMcVucJwxXeuD728EqVDDwQDxFMNo");

pub const ADDRESS_LOOKUP_TABLE_PROGRAM_ID: Pubkey =
    pubkey!("AddressLookupTab1e1111111111111111111111111");

/// 系统与 SPL 程序，以及已有专用布局的程序；不会被当作 CLMM 程序解码
pub const BUILTIN_PROGRAM_IDS: [Pubkey; 9] = [
    SYSTEM_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
    TOKEN_2022_PROGRAM_ID,
    ASSOCIATED_TOKEN_PROGRAM_ID,
    MEMO_PROGRAM_ID,
    MEMO_V1_PROGRAM_ID,
    ADDRESS_LOOKUP_TABLE_PROGRAM_ID,
    COMPUTE_BUDGET_PROGRAM_ID,
    TOKEN_METADATA_PROGRAM_ID,
];

/// 默认识别为 CLMM 的程序列表
pub const DEFAULT_CLMM_PROGRAM_IDS: [Pubkey; 2] =
    [RAYDIUM_CLMM_PROGRAM_ID, RAYDIUM_CLMM_DEVNET_PROGRAM_ID];

pub fn is_builtin_program(program_id: &Pubkey) -> bool {
    BUILTIN_PROGRAM_IDS.contains(program_id)
}
