//! TxInspector 测试：分类、逐条解码、余额变化与报告

mod common;

use clmm_tx_decoder::TxInspector;
use clmm_tx_decoder::common::{FetchError, InspectorConfig, MockTransactionSource};
use clmm_tx_decoder::constants::{
    ASSOCIATED_TOKEN_PROGRAM_ID, COMPUTE_BUDGET_PROGRAM_ID, MEMO_PROGRAM_ID, RAYDIUM_CLMM_PROGRAM_ID,
    SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use clmm_tx_decoder::parser::{
    ClassificationMode, DecodedInstruction, InstructionDepth, InstructionKind, LayoutKind,
    RawInstruction,
};
use common::{swap_logs, swap_record, swap_v2, swap_v2_data, transfer_checked_data};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

fn inspector_with(source: MockTransactionSource, config: InspectorConfig) -> TxInspector {
    TxInspector::new(config, Arc::new(source))
}

#[test]
fn test_inspect_swap_transaction() {
    let record = swap_record("sig-swap", 500);
    let inspector = inspector_with(MockTransactionSource::new(), InspectorConfig::default());
    let report = inspector.inspect_record(&record);

    println!("分类: {}, 指令数: {}", report.kind, report.instructions.len());
    assert_eq!(report.kind, InstructionKind::Swap);
    assert!(report.success);
    assert_eq!(report.signer, Some(record.account_keys[0].to_string()));

    // 3 条顶层 + 1 条内部
    assert_eq!(report.instructions.len(), 4);
    assert_eq!(report.decoded_count(), 3);
    assert_eq!(report.failed_count(), 0);

    let decoded: Vec<&DecodedInstruction> = report.decoded().collect();
    assert!(matches!(decoded[0], DecodedInstruction::SetComputeUnitLimit(ix) if ix.units == 200_000));
    assert!(
        matches!(decoded[1], DecodedInstruction::SetComputeUnitPrice(ix) if ix.micro_lamports == 1_000_000)
    );
    assert_eq!(decoded[2], &DecodedInstruction::SwapV2(swap_v2(1_000_000, 990_000)));

    let inner = &report.instructions[3];
    assert_eq!(inner.depth, InstructionDepth::Inner);
    assert_eq!(inner.index, 2);
    assert_eq!(inner.inner_index, Some(0));
    assert!(inner.decoded.is_none() && inner.error.is_none());

    // 只有付款人的 SOL 余额变化（手续费）
    assert_eq!(report.sol_changes.len(), 1);
    assert_eq!(report.sol_changes[0].change, -5000);
    assert_eq!(report.token_changes.len(), 1);
    assert_eq!(report.token_changes[0].change, 1_000_000);
    assert_eq!(report.token_changes[0].ui_change(), 1.0);
    assert!(report.liquidity.is_none());
    assert!(report.block_time_display().starts_with("2023-11-14"));
}

#[test]
fn test_corrupted_instruction_does_not_abort() {
    let mut record = swap_record("sig-broken", 500);
    // SwapV2 载荷只保留 41 字节
    record.instructions[2].data.truncate(41);

    let inspector = inspector_with(MockTransactionSource::new(), InspectorConfig::default());
    let report = inspector.inspect_record(&record);

    assert_eq!(report.decoded_count(), 2);
    assert_eq!(report.failed_count(), 1);
    let failed = &report.instructions[2];
    assert!(failed.is_failed());
    let error = failed.error.as_deref().unwrap();
    println!("失败原因: {}", error);
    assert!(error.contains("offset 41"));
    assert_eq!(failed.data_hex, hex::encode(&record.instructions[2].data));
}

#[test]
fn test_per_instruction_classification() {
    let mut record = swap_record("sig-mixed", 500);
    let clmm = RAYDIUM_CLMM_PROGRAM_ID.to_string();
    record.log_messages.extend([
        format!("Program {clmm} invoke [1]"),
        "Program log: Instruction: CreatePool".to_string(),
        format!("Program {clmm} success"),
    ]);
    record.instructions.push(RawInstruction::new(
        RAYDIUM_CLMM_PROGRAM_ID,
        clmm_tx_decoder::constants::discriminators::raydium_clmm::CREATE_POOL.to_vec(),
        vec![0, 1],
    ));

    // 交易级分类：最后一条是 CreatePool，SwapV2 载荷按 CreatePool 解码失败
    let transaction_level =
        inspector_with(MockTransactionSource::new(), InspectorConfig::default());
    let report = transaction_level.inspect_record(&record);
    assert_eq!(report.kind, InstructionKind::CreatePool);
    assert_eq!(report.failed_count(), 1);

    // 逐条分类：每条指令使用自己的日志片段
    let config =
        InspectorConfig::default().with_classification_mode(ClassificationMode::PerInstruction);
    let per_instruction = inspector_with(MockTransactionSource::new(), config);
    let report = per_instruction.inspect_record(&record);
    println!("片段分类: {:?}", report.segment_kinds);
    assert_eq!(report.failed_count(), 0);
    let layouts: Vec<LayoutKind> = report.decoded().map(|d| d.layout()).collect();
    assert_eq!(
        layouts,
        vec![
            LayoutKind::SetComputeUnitLimit,
            LayoutKind::SetComputeUnitPrice,
            LayoutKind::SwapV2,
            LayoutKind::CreatePool,
        ]
    );
}

#[test]
fn test_segment_mismatch_falls_back() {
    let mut record = swap_record("sig-short-logs", 500);
    record.log_messages.truncate(4);
    record.log_messages.push("Program log: Instruction: SwapV2".to_string());

    let config =
        InspectorConfig::default().with_classification_mode(ClassificationMode::PerInstruction);
    let report = inspector_with(MockTransactionSource::new(), config).inspect_record(&record);
    assert_eq!(report.segment_kinds.len(), 2);
    assert_eq!(report.decoded_count(), 3);
}

#[test]
fn test_unconfigured_program_is_not_decoded() {
    let record = swap_record("sig-other", 500);
    let config = InspectorConfig::default().with_clmm_program_ids(vec![COMPUTE_BUDGET_PROGRAM_ID]);
    let report = inspector_with(MockTransactionSource::new(), config).inspect_record(&record);
    assert_eq!(report.kind, InstructionKind::Swap);
    assert_eq!(report.decoded_count(), 2);
}

#[test]
fn test_any_program_skips_system_and_spl_programs() {
    let custom = Pubkey::new_unique();
    let mut record = swap_record("sig-any", 500);
    let mut transfer = vec![2, 0, 0, 0];
    transfer.extend_from_slice(&1_000_000u64.to_le_bytes());
    record.instructions = vec![
        RawInstruction::new(ASSOCIATED_TOKEN_PROGRAM_ID, vec![1], vec![0, 2]),
        RawInstruction::new(SYSTEM_PROGRAM_ID, transfer, vec![0, 1]),
        RawInstruction::new(TOKEN_PROGRAM_ID, transfer_checked_data(), vec![2, 1, 0]),
        RawInstruction::new(MEMO_PROGRAM_ID, b"hello".to_vec(), vec![]),
        RawInstruction::new(custom, swap_v2_data(3, 2), vec![0, 1]),
    ];
    record.inner_instructions.clear();

    let config = InspectorConfig::default().with_clmm_program_ids(Vec::new());
    let report = inspector_with(MockTransactionSource::new(), config).inspect_record(&record);

    for ix in &report.instructions {
        println!("{} decoded={:?} err={:?}", ix.program_id, ix.decoded.is_some(), ix.error);
    }
    assert_eq!(report.kind, InstructionKind::Swap);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.decoded_count(), 1);
    assert_eq!(report.instructions[4].decoded, Some(DecodedInstruction::SwapV2(swap_v2(3, 2))));
}

#[test]
fn test_instruction_accounts_are_resolved() {
    let record = swap_record("sig-accounts", 500);
    let report = inspector_with(MockTransactionSource::new(), InspectorConfig::default())
        .inspect_record(&record);

    let swap = &report.instructions[2];
    assert_eq!(swap.accounts.len(), 4);
    assert_eq!(swap.accounts[0], record.account_keys[0].to_string());
    assert_eq!(swap.accounts[3], record.account_keys[6].to_string());
    assert!(report.instructions[0].accounts.is_empty());
}

#[test]
fn test_undecodable_payload_is_surfaced_not_decoded() {
    let mut record = swap_record("sig-garbled", 500);
    record.instructions[2].data.clear();
    record.instructions[2].undecoded_data = Some("0OIl!!".to_string());

    let report = inspector_with(MockTransactionSource::new(), InspectorConfig::default())
        .inspect_record(&record);
    let swap = &report.instructions[2];
    assert_eq!(swap.raw_data.as_deref(), Some("0OIl!!"));
    assert!(swap.decoded.is_none());
    assert!(!swap.is_failed());
    assert_eq!(report.decoded_count(), 2);
    report.log(&record);
}

#[test]
fn test_decode_payload() {
    let inspector = inspector_with(MockTransactionSource::new(), InspectorConfig::default());

    let decoded = inspector
        .decode_payload(&RAYDIUM_CLMM_PROGRAM_ID, &swap_v2_data(7, 6), None)
        .unwrap()
        .expect("应识别为 SwapV2");
    assert_eq!(decoded.layout(), LayoutKind::SwapV2);

    let forced = inspector.decode_payload(
        &RAYDIUM_CLMM_PROGRAM_ID,
        &swap_v2_data(7, 6),
        Some(LayoutKind::CreatePool),
    );
    assert!(forced.is_err());

    assert_eq!(inspector.decode_payload(&RAYDIUM_CLMM_PROGRAM_ID, &[9; 12], None), Ok(None));
}

#[tokio::test]
async fn test_fetch_and_inspect() {
    let source = MockTransactionSource::new();
    source.push_transaction(swap_record("sig-fetch", 900));
    let inspector = inspector_with(source, InspectorConfig::default());

    assert_eq!(inspector.health_check().await, Ok(900));

    let inspection = inspector
        .fetch_and_inspect("sig-fetch")
        .await
        .expect("获取失败")
        .expect("交易应存在");
    assert_eq!(inspection.record.log_messages, swap_logs());
    assert_eq!(inspection.report.kind, InstructionKind::Swap);
    inspection.log();

    assert!(inspector.fetch_and_inspect("sig-unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn test_health_check_failure() {
    let source = MockTransactionSource::new();
    source.fail_slot(FetchError::Rpc("connection refused".to_string()));
    let inspector = inspector_with(source, InspectorConfig::default());
    let err = inspector.health_check().await.unwrap_err();
    println!("健康检查失败: {}", err);
    assert!(matches!(err, FetchError::Rpc(_)));
}
