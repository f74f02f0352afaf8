//! 指令布局的基础 trait 与解码错误定义

use borsh::BorshSerialize;

use super::utils::BinaryReader;

/// 指令解码错误
///
/// 所有变体都携带完整的原始数据（hex），便于日志中定位问题
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("{layout} discriminator 不匹配: 期望 {expected}, 实际 {actual} (data: {data_hex})")]
    InvalidDiscriminator {
        layout: &'static str,
        expected: String,
        actual: String,
        data_hex: String,
    },
    #[error("数据长度不足: 在 offset {offset} 处读取 {needed} 字节, 缓冲区长度 {len} (data: {data_hex})")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
        data_hex: String,
    },
    #[error("offset {offset} 处的字符串无效: {reason} (data: {data_hex})")]
    InvalidString {
        offset: usize,
        reason: String,
        data_hex: String,
    },
    #[error("offset {offset} 处的标志位无效: {value} (data: {data_hex})")]
    InvalidFlag {
        offset: usize,
        value: u8,
        data_hex: String,
    },
}

impl DecodeError {
    /// 出错指令的原始数据（hex）
    pub fn data_hex(&self) -> &str {
        match self {
            DecodeError::InvalidDiscriminator { data_hex, .. }
            | DecodeError::Truncated { data_hex, .. }
            | DecodeError::InvalidString { data_hex, .. }
            | DecodeError::InvalidFlag { data_hex, .. } => data_hex,
        }
    }
}

/// 固定布局指令 trait
///
/// 每个可解码的指令结构实现此 trait：按字节顺序读取字段（出错时给出精确的 offset），
/// 编码由 borsh 派生，字段顺序即链上布局
pub trait InstructionLayout: BorshSerialize + Sized {
    /// 布局名称，用于日志和错误信息
    const NAME: &'static str;

    /// 从 reader 的当前位置读取整个布局（包括 discriminator）
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError>;

    /// 按布局重新编码
    fn encode(&self) -> Vec<u8> {
        // 写入 Vec 不会失败
        borsh::to_vec(self).unwrap_or_default()
    }

    /// 从完整的指令数据解码
    ///
    /// 固定布局之后的多余字节会被忽略
    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = BinaryReader::new(data);
        Self::read(&mut reader)
    }
}
