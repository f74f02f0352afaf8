pub mod binary_reader;

pub use binary_reader::BinaryReader;

use serde::Serializer;
use solana_sdk::pubkey::Pubkey;

/// 以 base58 字符串序列化 Pubkey
pub fn serialize_pubkey<S: Serializer>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(pubkey)
}

/// 以 hex 字符串序列化字节数组
pub fn serialize_hex<S: Serializer, T: AsRef<[u8]>>(
    bytes: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// 原始数量转换为 UI 数量（考虑 decimals）
pub fn format_token_amount(amount_raw: u64, decimals: u8) -> f64 {
    amount_raw as f64 / 10_f64.powi(decimals as i32)
}
