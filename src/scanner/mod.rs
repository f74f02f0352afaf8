//! 签名历史扫描
//!
//! 按时间倒序分页获取程序的签名历史（`before` 游标），逐笔获取交易并分类、解码。
//! 严格串行：同一时间只有一个请求在进行。

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tracing::{info, warn};

use crate::TxInspector;
use crate::common::SignatureQuery;
use crate::parser::classifier::classify_amm_log_line;
use crate::parser::types::{SignatureInfo, TransactionRecord};

/// 每笔交易的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// 分类 + 解码 + 输出报告
    #[default]
    Decode,
    /// 只输出命中 AMM 关键字的日志行
    LogsOnly,
}

/// 扫描参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub program_id: Pubkey,
    /// 每页签名数
    pub page_limit: usize,
    /// 最多请求的页数，None 表示直到历史起点
    pub max_pages: Option<usize>,
    /// 扫描到该签名为止（不包含）
    pub until: Option<String>,
    /// 两次分页请求之间的间隔
    pub page_delay: Duration,
    pub mode: ScanMode,
}

impl ScanOptions {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            page_limit: 10,
            max_pages: Some(10),
            until: None,
            page_delay: Duration::from_secs(1),
            mode: ScanMode::Decode,
        }
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_until(mut self, until: Option<String>) -> Self {
        self.until = until;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }
}

/// 扫描结束的原因
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// 空页：到达历史起点，或 until 之后没有更新的签名
    #[default]
    EmptyPage,
    /// 返回的签名数少于 page_limit
    ShortPage,
    /// 达到 max_pages
    PageLimitReached,
    /// 分页请求失败
    PageError(String),
}

/// 扫描统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// 发出的分页请求数（包括失败的请求）
    pub page_requests: usize,
    pub pages_fetched: usize,
    pub signatures_processed: usize,
    /// 执行成功（err 为空）的签名
    pub successful_signatures: Vec<String>,
    pub transactions_inspected: usize,
    pub transactions_missing: usize,
    pub instructions_decoded: usize,
    pub decode_failures: usize,
    pub fetch_failures: usize,
    pub amm_log_hits: usize,
    /// 见过的最大 slot
    pub last_slot: u64,
    /// 最后一页的最后一个签名
    pub last_cursor: Option<String>,
    pub stop_reason: StopReason,
}

impl ScanSummary {
    pub fn log(&self) {
        info!(
            pages = self.pages_fetched,
            signatures = self.signatures_processed,
            successful = self.successful_signatures.len(),
            inspected = self.transactions_inspected,
            decoded = self.instructions_decoded,
            decode_failures = self.decode_failures,
            fetch_failures = self.fetch_failures,
            last_slot = self.last_slot,
            "扫描结束: {:?}",
            self.stop_reason
        );
        if let Some(cursor) = &self.last_cursor {
            info!("最后游标: {}", cursor);
        }
    }
}

/// 签名历史扫描器
pub struct HistoryScanner<'a> {
    inspector: &'a TxInspector,
    options: ScanOptions,
}

impl<'a> HistoryScanner<'a> {
    pub fn new(inspector: &'a TxInspector, options: ScanOptions) -> Self {
        Self { inspector, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// 执行扫描
    ///
    /// 分页失败终止扫描；单笔交易失败只记录日志并继续
    pub async fn run(&self) -> ScanSummary {
        let mut summary = ScanSummary::default();
        let mut before: Option<String> = None;

        loop {
            if self.max_pages_reached(&summary) {
                summary.stop_reason = StopReason::PageLimitReached;
                break;
            }

            let query = SignatureQuery {
                before: before.clone(),
                until: self.options.until.clone(),
                limit: self.options.page_limit,
            };
            summary.page_requests += 1;
            let page = match self
                .inspector
                .source()
                .get_signatures_for_address(&self.options.program_id, &query)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!("获取签名列表失败 (before: {:?}): {}", query.before, e);
                    summary.fetch_failures += 1;
                    summary.stop_reason = StopReason::PageError(e.to_string());
                    break;
                }
            };
            summary.pages_fetched += 1;

            if page.is_empty() {
                info!("没有更多签名 (before: {:?})", query.before);
                summary.stop_reason = StopReason::EmptyPage;
                break;
            }
            info!("第 {} 页: {} 个签名", summary.pages_fetched, page.len());

            for signature in &page {
                self.process_signature(signature, &mut summary).await;
            }

            before = page.last().map(|s| s.signature.clone());
            summary.last_cursor = before.clone();

            if page.len() < self.options.page_limit {
                summary.stop_reason = StopReason::ShortPage;
                break;
            }
            if self.max_pages_reached(&summary) {
                summary.stop_reason = StopReason::PageLimitReached;
                break;
            }
            tokio::time::sleep(self.options.page_delay).await;
        }

        summary
    }

    fn max_pages_reached(&self, summary: &ScanSummary) -> bool {
        self.options.max_pages.is_some_and(|max| summary.page_requests >= max)
    }

    async fn process_signature(&self, signature: &SignatureInfo, summary: &mut ScanSummary) {
        summary.signatures_processed += 1;
        summary.last_slot = summary.last_slot.max(signature.slot);
        if signature.is_success() {
            summary.successful_signatures.push(signature.signature.clone());
        }

        let record = match self.inspector.source().get_transaction(&signature.signature).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("交易不存在: {}", signature.signature);
                summary.transactions_missing += 1;
                return;
            }
            Err(e) => {
                warn!("获取交易失败 {}: {}", signature.signature, e);
                summary.fetch_failures += 1;
                return;
            }
        };
        summary.last_slot = summary.last_slot.max(record.slot);
        summary.transactions_inspected += 1;

        match self.options.mode {
            ScanMode::Decode => {
                let report = self.inspector.inspect_record(&record);
                report.log(&record);
                summary.instructions_decoded += report.decoded_count();
                summary.decode_failures += report.failed_count();
            }
            ScanMode::LogsOnly => {
                summary.amm_log_hits += log_amm_actions(&record);
            }
        }
    }
}

/// 输出命中 AMM 关键字的日志行，返回命中数
pub fn log_amm_actions(record: &TransactionRecord) -> usize {
    let mut hits = 0;
    for line in &record.log_messages {
        if let Some(action) = classify_amm_log_line(line) {
            info!(signature = %record.signature, action = %action, "{}", line);
            hits += 1;
        }
    }
    hits
}
