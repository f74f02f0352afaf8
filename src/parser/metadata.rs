//! Metaplex Token Metadata: create_metadata_account_v3 布局
//!
//! collection 与 uses 子结构不展开解析，按固定长度保留原始字节；
//! 末尾的 collection_details 等可选字段被忽略

use borsh::{BorshDeserialize, BorshSerialize};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::constants::discriminators::token_metadata;
use crate::parser::base_parser::{DecodeError, InstructionLayout};
use crate::parser::utils::{BinaryReader, serialize_hex, serialize_pubkey};

/// collection: verified(1) + key(32)
pub const COLLECTION_LEN: usize = 33;
/// uses: use_method(1) + remaining(8) + total(8)
pub const USES_LEN: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, BorshSerialize, BorshDeserialize)]
pub struct Creator {
    #[serde(serialize_with = "serialize_pubkey")]
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

/// 参数即 borsh 编码的 `DataV2` + `is_mutable`，前置 1 字节 tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, BorshSerialize, BorshDeserialize)]
pub struct CreateMetadataAccountV3 {
    pub discriminator: u8,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    #[serde(serialize_with = "serialize_opaque")]
    pub collection: Option<[u8; COLLECTION_LEN]>,
    #[serde(serialize_with = "serialize_opaque")]
    pub uses: Option<[u8; USES_LEN]>,
    pub is_mutable: bool,
}

fn serialize_opaque<S: serde::Serializer, const N: usize>(
    value: &Option<[u8; N]>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(bytes) => serialize_hex(bytes, serializer),
        None => serializer.serialize_none(),
    }
}

impl InstructionLayout for CreateMetadataAccountV3 {
    const NAME: &'static str = "CreateMetadataAccountV3";

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        let discriminator =
            reader.expect_tag(Self::NAME, token_metadata::CREATE_METADATA_ACCOUNT_V3)?;
        let name = reader.read_string()?;
        let symbol = reader.read_string()?;
        let uri = reader.read_string()?;
        let seller_fee_basis_points = reader.read_u16()?;

        let creators = if reader.read_bool()? {
            let count = reader.read_u32()? as usize;
            // 每个 creator 34 字节，先校验长度再分配
            if count.saturating_mul(34) > reader.remaining() {
                return Err(DecodeError::Truncated {
                    offset: reader.offset(),
                    needed: count.saturating_mul(34),
                    len: reader.offset() + reader.remaining(),
                    data_hex: reader.data_hex(),
                });
            }
            let mut creators = Vec::with_capacity(count);
            for _ in 0..count {
                creators.push(Creator {
                    address: reader.read_pubkey()?,
                    verified: reader.read_bool()?,
                    share: reader.read_u8()?,
                });
            }
            Some(creators)
        } else {
            None
        };

        let collection =
            if reader.read_bool()? { Some(reader.read_array::<COLLECTION_LEN>()?) } else { None };
        let uses = if reader.read_bool()? { Some(reader.read_array::<USES_LEN>()?) } else { None };
        let is_mutable = reader.read_bool()?;

        Ok(Self {
            discriminator,
            name,
            symbol,
            uri,
            seller_fee_basis_points,
            creators,
            collection,
            uses,
            is_mutable,
        })
    }
}
