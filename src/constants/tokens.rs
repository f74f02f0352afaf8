//! 常用代币常量定义
//!
//! 用于在余额变化中标注已知代币的 symbol

use solana_sdk::pubkey;

pub use solana_sdk::pubkey::Pubkey;

/// SOL Mint (Wrapped SOL)
pub const SOL_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

/// USDC Mint (mainnet)
pub const USDC_MINT: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

/// USDT Mint (mainnet)
pub const USDT_MINT: Pubkey = pubkey!("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB");

/// RAY (Raydium) Mint
pub const RAY_MINT: Pubkey = pubkey!("4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R");

const KNOWN_TOKENS: [(Pubkey, &str); 4] =
    [(SOL_MINT, "WSOL"), (USDC_MINT, "USDC"), (USDT_MINT, "USDT"), (RAY_MINT, "RAY")];

/// 已知代币的 symbol
pub fn known_symbol(mint: &Pubkey) -> Option<&'static str> {
    KNOWN_TOKENS.iter().find(|(known, _)| known == mint).map(|(_, symbol)| *symbol)
}
