//! Raydium 指令布局

pub mod clmm;

pub use clmm::{CreatePool, DecreaseLiquidityV2, IncreaseLiquidityV2, SwapV2};
