//! BinaryReader - 二进制数据读取工具
//!
//! 小端序、带边界检查；任何越界读取都返回 `DecodeError::Truncated`，不会 panic

use solana_sdk::pubkey::Pubkey;

use crate::parser::base_parser::DecodeError;

#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// 整个缓冲区的 hex 表示（用于错误信息）
    pub fn data_hex(&self) -> String {
        hex::encode(self.buffer)
    }

    fn check_bounds(&self, length: usize) -> Result<(), DecodeError> {
        match self.offset.checked_add(length) {
            Some(end) if end <= self.buffer.len() => Ok(()),
            _ => Err(DecodeError::Truncated {
                offset: self.offset,
                needed: length,
                len: self.buffer.len(),
                data_hex: self.data_hex(),
            }),
        }
    }

    pub fn read_fixed_array(&mut self, length: usize) -> Result<&'a [u8], DecodeError> {
        self.check_bounds(length)?;
        let slice = &self.buffer[self.offset..self.offset + length];
        self.offset += length;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_fixed_array(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_u128(&mut self) -> Result<u128, DecodeError> {
        Ok(u128::from_le_bytes(self.read_array()?))
    }

    /// 读取 0/1 标志位，其他取值视为错误
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(DecodeError::InvalidFlag {
                offset,
                value,
                data_hex: self.data_hex(),
            }),
        }
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey, DecodeError> {
        Ok(Pubkey::new_from_array(self.read_array::<32>()?))
    }

    /// 读取 u32 长度前缀 + UTF-8 字节的字符串
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let offset = self.offset;
        let length = self.read_u32()? as usize;
        if length > self.remaining() {
            return Err(DecodeError::InvalidString {
                offset,
                reason: format!("长度前缀 {} 超过剩余字节数 {}", length, self.remaining()),
                data_hex: self.data_hex(),
            });
        }
        let bytes = self.read_fixed_array(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| DecodeError::InvalidString {
            offset,
            reason: format!("非法 UTF-8: {e}"),
            data_hex: self.data_hex(),
        })
    }

    /// 读取 8 字节 discriminator 并校验
    pub fn expect_discriminator(
        &mut self,
        layout: &'static str,
        expected: [u8; 8],
    ) -> Result<u64, DecodeError> {
        let actual = self.read_array::<8>()?;
        if actual != expected {
            return Err(DecodeError::InvalidDiscriminator {
                layout,
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
                data_hex: self.data_hex(),
            });
        }
        Ok(u64::from_le_bytes(actual))
    }

    /// 读取 1 字节 discriminator 并校验
    pub fn expect_tag(&mut self, layout: &'static str, expected: u8) -> Result<u8, DecodeError> {
        let actual = self.read_u8()?;
        if actual != expected {
            return Err(DecodeError::InvalidDiscriminator {
                layout,
                expected: expected.to_string(),
                actual: actual.to_string(),
                data_hex: self.data_hex(),
            });
        }
        Ok(actual)
    }

    pub fn skip(&mut self, length: usize) -> Result<(), DecodeError> {
        self.check_bounds(length)?;
        self.offset += length;
        Ok(())
    }
}
