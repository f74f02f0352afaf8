pub mod common;
pub mod constants;
pub mod parser;
pub mod scanner;

use crate::common::{FetchError, InspectorConfig, RpcTransactionSource, TransactionSource};
use crate::parser::classifier::{ClassificationMode, classify_logs, classify_top_level};
use crate::parser::instruction_decoder::{
    DecodeOutcome, DecodedInstruction, InstructionDecoder, InstructionDepth, LayoutKind,
};
use crate::parser::log_parser::find_liquidity_info;
use crate::parser::report::{
    InstructionReport, TransactionReport, sol_balance_changes, token_balance_changes,
};
use crate::parser::{DecodeError, InstructionKind, RawInstruction, TransactionRecord};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::warn;

pub use crate::scanner::{HistoryScanner, ScanMode, ScanOptions, ScanSummary};

/// A fetched transaction together with its inspection report
#[derive(Debug, Clone)]
pub struct Inspection {
    pub record: TransactionRecord,
    pub report: TransactionReport,
}

impl Inspection {
    /// Emit the report as structured log lines
    pub fn log(&self) {
        self.report.log(&self.record);
    }
}

/// Transaction inspector for Raydium CLMM style programs
///
/// `TxInspector` classifies transactions by their log lines and decodes the raw payloads
/// of CLMM, compute-budget and token-metadata instructions. It owns no global state:
/// construct one at startup, pass it to whatever needs it and drop it at shutdown.
pub struct TxInspector {
    config: InspectorConfig,
    decoder: InstructionDecoder,
    /// Where signatures and transaction bodies come from (RPC node, fixtures, tests)
    source: Arc<dyn TransactionSource>,
}

impl TxInspector {
    /// Create an inspector over an explicit transaction source
    pub fn new(config: InspectorConfig, source: Arc<dyn TransactionSource>) -> Self {
        let decoder = InstructionDecoder::new(config.clmm_program_ids.clone());
        Self { config, decoder, source }
    }

    /// Create an inspector backed by the JSON-RPC node named in the configuration
    pub fn from_config(config: InspectorConfig) -> Self {
        let source = Arc::new(RpcTransactionSource::new(&config));
        Self::new(config, source)
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn decoder(&self) -> &InstructionDecoder {
        &self.decoder
    }

    pub fn source(&self) -> &Arc<dyn TransactionSource> {
        &self.source
    }

    /// Check that the upstream node answers; returns the current slot
    pub async fn health_check(&self) -> Result<u64, FetchError> {
        self.source.get_slot().await
    }

    /// Fetch a transaction by signature and inspect it
    ///
    /// Returns `Ok(None)` when the node does not know the signature.
    pub async fn fetch_and_inspect(&self, signature: &str) -> Result<Option<Inspection>, FetchError> {
        let Some(record) = self.source.get_transaction(signature).await? else {
            return Ok(None);
        };
        let report = self.inspect_record(&record);
        Ok(Some(Inspection { record, report }))
    }

    /// Classify a transaction and decode every instruction that has a known layout
    ///
    /// Decode failures are logged and recorded in the report; they never abort the
    /// inspection of the remaining instructions.
    pub fn inspect_record(&self, record: &TransactionRecord) -> TransactionReport {
        let kind = classify_logs(&record.log_messages);
        let segment_kinds = classify_top_level(&record.log_messages);
        let instruction_kinds = self.instruction_kinds(record, kind, &segment_kinds);

        let mut instructions = Vec::new();
        for (index, instruction) in record.instructions.iter().enumerate() {
            let ix_kind = instruction_kinds.get(index).copied().unwrap_or(kind);
            instructions.push(self.inspect_instruction(
                record,
                instruction,
                index,
                None,
                ix_kind,
            ));
            for (inner_index, inner) in record.inner_instructions_for(index).iter().enumerate() {
                instructions.push(self.inspect_instruction(
                    record,
                    inner,
                    index,
                    Some(inner_index),
                    ix_kind,
                ));
            }
        }

        TransactionReport {
            signature: record.signature.clone(),
            slot: record.slot,
            block_time: record.block_time,
            success: record.is_success(),
            err: record.err.clone(),
            fee: record.fee,
            signer: record.signer().map(|signer| signer.to_string()),
            kind,
            segment_kinds,
            instructions,
            sol_changes: sol_balance_changes(record),
            token_changes: token_balance_changes(record),
            liquidity: find_liquidity_info(&record.log_messages),
        }
    }

    /// Decode a standalone payload, e.g. one copied from an explorer
    ///
    /// Without logs to classify, CLMM instructions are recognised by their 8-byte
    /// discriminator. Returns `Ok(None)` when no layout applies.
    pub fn decode_payload(
        &self,
        program_id: &Pubkey,
        data: &[u8],
        layout: Option<LayoutKind>,
    ) -> Result<Option<DecodedInstruction>, DecodeError> {
        match layout.or_else(|| self.decoder.detect_layout(program_id, data)) {
            Some(layout) => layout.decode(data).map(Some),
            None => Ok(None),
        }
    }

    /// Per-top-level-instruction classification according to the configured mode
    fn instruction_kinds(
        &self,
        record: &TransactionRecord,
        kind: InstructionKind,
        segment_kinds: &[InstructionKind],
    ) -> Vec<InstructionKind> {
        match self.config.classification_mode {
            ClassificationMode::Transaction => vec![kind; record.instructions.len()],
            ClassificationMode::PerInstruction => {
                if segment_kinds.len() == record.instructions.len() {
                    segment_kinds.to_vec()
                } else {
                    warn!(
                        "{} 日志片段数 {} 与顶层指令数 {} 不一致，回退到交易级分类 {}",
                        record.signature,
                        segment_kinds.len(),
                        record.instructions.len(),
                        kind
                    );
                    vec![kind; record.instructions.len()]
                }
            }
        }
    }

    fn inspect_instruction(
        &self,
        record: &TransactionRecord,
        instruction: &RawInstruction,
        index: usize,
        inner_index: Option<usize>,
        kind: InstructionKind,
    ) -> InstructionReport {
        let depth = match inner_index {
            Some(_) => InstructionDepth::Inner,
            None => InstructionDepth::TopLevel,
        };
        let mut report = InstructionReport {
            index,
            inner_index,
            depth,
            program_id: instruction.program_id,
            kind,
            data_hex: hex::encode(&instruction.data),
            raw_data: instruction.undecoded_data.clone(),
            accounts: record
                .resolve_accounts(instruction)
                .iter()
                .map(|account| account.to_string())
                .collect(),
            parsed: instruction.parsed.clone(),
            decoded: None,
            error: None,
        };

        match self.decoder.decode_instruction(instruction, depth, kind) {
            DecodeOutcome::Decoded(decoded) => report.decoded = Some(decoded),
            DecodeOutcome::Failed { layout, error } => {
                warn!(
                    "{} 指令 [{}{}] {} 解码失败 ({}): {}",
                    record.signature,
                    index,
                    inner_index.map(|i| format!(".{i}")).unwrap_or_default(),
                    instruction.program_id,
                    layout,
                    error
                );
                report.error = Some(error.to_string());
            }
            DecodeOutcome::Skipped => {}
        }
        report
    }
}
