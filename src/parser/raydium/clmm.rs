//! Raydium CLMM 指令布局
//!
//! Anchor 指令：8 字节 discriminator + 参数，小端序

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::discriminators::raydium_clmm;
use crate::parser::base_parser::{DecodeError, InstructionLayout};
use crate::parser::utils::BinaryReader;

/// swap_v2 指令参数
///
/// 布局：disc(8) + amount(8) + other_amount_threshold(8) + sqrt_price_limit_x64(16)
/// + is_base_input(1) + padding(1)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct SwapV2 {
    pub discriminator: u64,
    pub amount: u64,
    pub other_amount_threshold: u64,
    pub sqrt_price_limit_x64: u128,
    pub is_base_input: bool,
    pub padding: u8,
}

impl SwapV2 {
    pub const LEN: usize = 42;
}

impl InstructionLayout for SwapV2 {
    const NAME: &'static str = "SwapV2";

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            discriminator: reader.expect_discriminator(Self::NAME, raydium_clmm::SWAP_V2)?,
            amount: reader.read_u64()?,
            other_amount_threshold: reader.read_u64()?,
            sqrt_price_limit_x64: reader.read_u128()?,
            is_base_input: reader.read_bool()?,
            padding: reader.read_u8()?,
        })
    }
}

/// increase_liquidity_v2 指令参数
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct IncreaseLiquidityV2 {
    pub discriminator: u64,
    pub liquidity: u128,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
    pub base_flag: bool,
    pub padding: [u8; 2],
}

impl IncreaseLiquidityV2 {
    pub const LEN: usize = 43;
}

impl InstructionLayout for IncreaseLiquidityV2 {
    const NAME: &'static str = "IncreaseLiquidityV2";

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            discriminator: reader
                .expect_discriminator(Self::NAME, raydium_clmm::INCREASE_LIQUIDITY_V2)?,
            liquidity: reader.read_u128()?,
            amount_0_max: reader.read_u64()?,
            amount_1_max: reader.read_u64()?,
            base_flag: reader.read_bool()?,
            padding: reader.read_array::<2>()?,
        })
    }
}

/// decrease_liquidity_v2 指令参数
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct DecreaseLiquidityV2 {
    pub discriminator: u64,
    pub liquidity: u128,
    pub amount_0_min: u64,
    pub amount_1_min: u64,
}

impl DecreaseLiquidityV2 {
    pub const LEN: usize = 40;
}

impl InstructionLayout for DecreaseLiquidityV2 {
    const NAME: &'static str = "DecreaseLiquidityV2";

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            discriminator: reader
                .expect_discriminator(Self::NAME, raydium_clmm::DECREASE_LIQUIDITY_V2)?,
            liquidity: reader.read_u128()?,
            amount_0_min: reader.read_u64()?,
            amount_1_min: reader.read_u64()?,
        })
    }
}

/// create_pool 指令，只解析 discriminator
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct CreatePool {
    pub discriminator: u64,
}

impl CreatePool {
    pub const LEN: usize = 8;
}

impl InstructionLayout for CreatePool {
    const NAME: &'static str = "CreatePool";

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self { discriminator: reader.expect_discriminator(Self::NAME, raydium_clmm::CREATE_POOL)? })
    }
}
