//! Solana 交易解析模块：分类、指令解码与报告

pub mod base_parser;
pub mod classifier;
pub mod compute_budget;
pub mod instruction_decoder;
pub mod log_parser;
pub mod metadata;
pub mod raydium;
pub mod report;
pub mod transaction_adapter;
pub mod types;
pub mod utils;

pub use base_parser::{DecodeError, InstructionLayout};
pub use classifier::{
    AmmLogAction, ClassificationMode, InstructionKind, classify_amm_log_line, classify_line,
    classify_logs, classify_top_level,
};
pub use instruction_decoder::{
    DecodeOutcome, DecodedInstruction, InstructionDecoder, InstructionDepth, LayoutKind,
};
pub use report::{InstructionReport, TransactionReport};
pub use transaction_adapter::AdapterError;
pub use types::*;
pub use utils::BinaryReader;
