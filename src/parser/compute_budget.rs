//! Compute Budget 指令布局（1 字节 discriminator）

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::discriminators::compute_budget;
use crate::parser::base_parser::{DecodeError, InstructionLayout};
use crate::parser::utils::BinaryReader;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct SetComputeUnitLimit {
    pub discriminator: u8,
    pub units: u32,
}

impl InstructionLayout for SetComputeUnitLimit {
    const NAME: &'static str = "SetComputeUnitLimit";

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            discriminator: reader.expect_tag(Self::NAME, compute_budget::SET_COMPUTE_UNIT_LIMIT)?,
            units: reader.read_u32()?,
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct SetComputeUnitPrice {
    pub discriminator: u8,
    pub micro_lamports: u64,
}

impl InstructionLayout for SetComputeUnitPrice {
    const NAME: &'static str = "SetComputeUnitPrice";

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            discriminator: reader.expect_tag(Self::NAME, compute_budget::SET_COMPUTE_UNIT_PRICE)?,
            micro_lamports: reader.read_u64()?,
        })
    }
}
