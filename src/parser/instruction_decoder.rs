//! 指令解码器
//!
//! 根据分类结果、程序ID和首字节选择布局，然后按布局解码原始数据

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

use crate::constants::discriminators::{compute_budget, raydium_clmm};
use crate::constants::programs::{
    COMPUTE_BUDGET_PROGRAM_ID, DEFAULT_CLMM_PROGRAM_IDS, TOKEN_METADATA_PROGRAM_ID,
    is_builtin_program,
};
use crate::parser::base_parser::{DecodeError, InstructionLayout};
use crate::parser::classifier::InstructionKind;
use crate::parser::compute_budget::{SetComputeUnitLimit, SetComputeUnitPrice};
use crate::parser::metadata::CreateMetadataAccountV3;
use crate::parser::raydium::{CreatePool, DecreaseLiquidityV2, IncreaseLiquidityV2, SwapV2};
use crate::parser::types::RawInstruction;

/// 解码后的指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum DecodedInstruction {
    SwapV2(SwapV2),
    IncreaseLiquidityV2(IncreaseLiquidityV2),
    DecreaseLiquidityV2(DecreaseLiquidityV2),
    CreatePool(CreatePool),
    SetComputeUnitLimit(SetComputeUnitLimit),
    SetComputeUnitPrice(SetComputeUnitPrice),
    CreateMetadataAccountV3(CreateMetadataAccountV3),
}

impl DecodedInstruction {
    pub fn layout(&self) -> LayoutKind {
        match self {
            DecodedInstruction::SwapV2(_) => LayoutKind::SwapV2,
            DecodedInstruction::IncreaseLiquidityV2(_) => LayoutKind::IncreaseLiquidityV2,
            DecodedInstruction::DecreaseLiquidityV2(_) => LayoutKind::DecreaseLiquidityV2,
            DecodedInstruction::CreatePool(_) => LayoutKind::CreatePool,
            DecodedInstruction::SetComputeUnitLimit(_) => LayoutKind::SetComputeUnitLimit,
            DecodedInstruction::SetComputeUnitPrice(_) => LayoutKind::SetComputeUnitPrice,
            DecodedInstruction::CreateMetadataAccountV3(_) => LayoutKind::CreateMetadataAccountV3,
        }
    }

    pub fn name(&self) -> &'static str {
        self.layout().name()
    }

    /// 重新编码为原始布局字节
    pub fn encode(&self) -> Vec<u8> {
        match self {
            DecodedInstruction::SwapV2(ix) => ix.encode(),
            DecodedInstruction::IncreaseLiquidityV2(ix) => ix.encode(),
            DecodedInstruction::DecreaseLiquidityV2(ix) => ix.encode(),
            DecodedInstruction::CreatePool(ix) => ix.encode(),
            DecodedInstruction::SetComputeUnitLimit(ix) => ix.encode(),
            DecodedInstruction::SetComputeUnitPrice(ix) => ix.encode(),
            DecodedInstruction::CreateMetadataAccountV3(ix) => ix.encode(),
        }
    }
}

/// 指令布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    SwapV2,
    IncreaseLiquidityV2,
    DecreaseLiquidityV2,
    CreatePool,
    SetComputeUnitLimit,
    SetComputeUnitPrice,
    CreateMetadataAccountV3,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 7] = [
        LayoutKind::SwapV2,
        LayoutKind::IncreaseLiquidityV2,
        LayoutKind::DecreaseLiquidityV2,
        LayoutKind::CreatePool,
        LayoutKind::SetComputeUnitLimit,
        LayoutKind::SetComputeUnitPrice,
        LayoutKind::CreateMetadataAccountV3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::SwapV2 => SwapV2::NAME,
            LayoutKind::IncreaseLiquidityV2 => IncreaseLiquidityV2::NAME,
            LayoutKind::DecreaseLiquidityV2 => DecreaseLiquidityV2::NAME,
            LayoutKind::CreatePool => CreatePool::NAME,
            LayoutKind::SetComputeUnitLimit => SetComputeUnitLimit::NAME,
            LayoutKind::SetComputeUnitPrice => SetComputeUnitPrice::NAME,
            LayoutKind::CreateMetadataAccountV3 => CreateMetadataAccountV3::NAME,
        }
    }

    /// 按布局解码
    pub fn decode(&self, data: &[u8]) -> Result<DecodedInstruction, DecodeError> {
        Ok(match self {
            LayoutKind::SwapV2 => DecodedInstruction::SwapV2(SwapV2::decode(data)?),
            LayoutKind::IncreaseLiquidityV2 => {
                DecodedInstruction::IncreaseLiquidityV2(IncreaseLiquidityV2::decode(data)?)
            }
            LayoutKind::DecreaseLiquidityV2 => {
                DecodedInstruction::DecreaseLiquidityV2(DecreaseLiquidityV2::decode(data)?)
            }
            LayoutKind::CreatePool => DecodedInstruction::CreatePool(CreatePool::decode(data)?),
            LayoutKind::SetComputeUnitLimit => {
                DecodedInstruction::SetComputeUnitLimit(SetComputeUnitLimit::decode(data)?)
            }
            LayoutKind::SetComputeUnitPrice => {
                DecodedInstruction::SetComputeUnitPrice(SetComputeUnitPrice::decode(data)?)
            }
            LayoutKind::CreateMetadataAccountV3 => {
                DecodedInstruction::CreateMetadataAccountV3(CreateMetadataAccountV3::decode(data)?)
            }
        })
    }

    /// 按 8 字节 Anchor discriminator 识别 CLMM 布局（离线解码时没有日志可用）
    pub fn from_clmm_discriminator(data: &[u8]) -> Option<Self> {
        let disc: [u8; 8] = data.get(..8)?.try_into().ok()?;
        match disc {
            raydium_clmm::SWAP_V2 => Some(LayoutKind::SwapV2),
            raydium_clmm::INCREASE_LIQUIDITY_V2 => Some(LayoutKind::IncreaseLiquidityV2),
            raydium_clmm::DECREASE_LIQUIDITY_V2 => Some(LayoutKind::DecreaseLiquidityV2),
            raydium_clmm::CREATE_POOL => Some(LayoutKind::CreatePool),
            _ => None,
        }
    }

    /// 按首字节识别 Compute Budget 布局
    pub fn from_compute_budget_tag(data: &[u8]) -> Option<Self> {
        match data.first().copied()? {
            compute_budget::SET_COMPUTE_UNIT_LIMIT => Some(LayoutKind::SetComputeUnitLimit),
            compute_budget::SET_COMPUTE_UNIT_PRICE => Some(LayoutKind::SetComputeUnitPrice),
            _ => None,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    /// 不区分大小写，忽略 `-` 与 `_`，例如 `swap-v2`、`SwapV2`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.chars().filter(|c| *c != '-' && *c != '_').collect::<String>().to_lowercase();
        LayoutKind::ALL
            .into_iter()
            .find(|kind| kind.name().to_lowercase() == normalized)
            .ok_or_else(|| format!("未知的指令布局: {s}"))
    }
}

impl InstructionKind {
    /// 分类结果对应的 CLMM 布局
    pub fn layout(&self) -> Option<LayoutKind> {
        match self {
            InstructionKind::Swap => Some(LayoutKind::SwapV2),
            InstructionKind::AddLiquidity => Some(LayoutKind::IncreaseLiquidityV2),
            InstructionKind::RemoveLiquidity => Some(LayoutKind::DecreaseLiquidityV2),
            InstructionKind::CreatePool => Some(LayoutKind::CreatePool),
            InstructionKind::InitializeReward
            | InstructionKind::OpenPosition
            | InstructionKind::Unknown => None,
        }
    }
}

/// 指令所处层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionDepth {
    TopLevel,
    Inner,
}

/// 单条指令的解码结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Decoded(DecodedInstruction),
    Failed { layout: LayoutKind, error: DecodeError },
    /// 没有适用的布局
    Skipped,
}

/// 指令解码器
#[derive(Debug, Clone)]
pub struct InstructionDecoder {
    /// 视为 CLMM 的程序，为空时除内置程序外的所有程序都视为 CLMM
    clmm_program_ids: Vec<Pubkey>,
}

impl Default for InstructionDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_CLMM_PROGRAM_IDS.to_vec())
    }
}

impl InstructionDecoder {
    pub fn new(clmm_program_ids: Vec<Pubkey>) -> Self {
        Self { clmm_program_ids }
    }

    pub fn clmm_program_ids(&self) -> &[Pubkey] {
        &self.clmm_program_ids
    }

    pub fn is_clmm_program(&self, program_id: &Pubkey) -> bool {
        if self.clmm_program_ids.is_empty() {
            !is_builtin_program(program_id)
        } else {
            self.clmm_program_ids.contains(program_id)
        }
    }

    /// 为指令选择布局
    ///
    /// - Compute Budget：按首字节 2/3 选择，其余 tag 不解码
    /// - Token Metadata：总是尝试 CreateMetadataAccountV3
    /// - CLMM 程序的顶层指令：按分类结果选择
    /// - 节点已解析的指令、原始数据无法解码的指令和其他内部指令：不解码
    pub fn route(
        &self,
        instruction: &RawInstruction,
        depth: InstructionDepth,
        kind: InstructionKind,
    ) -> Option<LayoutKind> {
        if instruction.is_parsed() || instruction.undecoded_data.is_some() {
            return None;
        }
        let program_id = &instruction.program_id;
        if *program_id == COMPUTE_BUDGET_PROGRAM_ID {
            return LayoutKind::from_compute_budget_tag(&instruction.data);
        }
        if *program_id == TOKEN_METADATA_PROGRAM_ID {
            return Some(LayoutKind::CreateMetadataAccountV3);
        }
        if depth == InstructionDepth::TopLevel && self.is_clmm_program(program_id) {
            return kind.layout();
        }
        None
    }

    /// 选择布局并解码
    pub fn decode_instruction(
        &self,
        instruction: &RawInstruction,
        depth: InstructionDepth,
        kind: InstructionKind,
    ) -> DecodeOutcome {
        match self.route(instruction, depth, kind) {
            Some(layout) => match layout.decode(&instruction.data) {
                Ok(decoded) => DecodeOutcome::Decoded(decoded),
                Err(error) => DecodeOutcome::Failed { layout, error },
            },
            None => DecodeOutcome::Skipped,
        }
    }

    /// 离线选择布局：没有日志时 CLMM 指令按 discriminator 识别
    pub fn detect_layout(&self, program_id: &Pubkey, data: &[u8]) -> Option<LayoutKind> {
        if *program_id == COMPUTE_BUDGET_PROGRAM_ID {
            return LayoutKind::from_compute_budget_tag(data);
        }
        if *program_id == TOKEN_METADATA_PROGRAM_ID {
            return Some(LayoutKind::CreateMetadataAccountV3);
        }
        if self.is_clmm_program(program_id) {
            return LayoutKind::from_clmm_discriminator(data);
        }
        None
    }
}
