use anyhow::{Context, anyhow};
use base64::Engine;
use clap::{Parser, Subcommand, ValueEnum};
use clmm_tx_decoder::common::{
    AnyResult, InspectorConfig, MockTransactionSource, RpcTransactionSource, TransactionSource,
    parse_address,
};
use clmm_tx_decoder::constants::DEFAULT_CLMM_PROGRAM_IDS;
use clmm_tx_decoder::parser::{ClassificationMode, LayoutKind};
use clmm_tx_decoder::{HistoryScanner, ScanMode, ScanOptions, TxInspector};
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_transaction_status::UiTransactionEncoding;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clmm-tx-decoder", version, about = "Inspect Raydium CLMM transactions")]
struct Cli {
    /// JSON-RPC endpoint
    #[arg(long, env = "RPC_URL", default_value = "http://127.0.0.1:8899")]
    rpc_url: String,

    /// processed | confirmed | finalized
    #[arg(long, env = "COMMITMENT", default_value = "confirmed")]
    commitment: String,

    /// Comma separated program ids decoded as CLMM (defaults to mainnet + devnet)
    #[arg(long, env = "CLMM_PROGRAM_IDS", value_delimiter = ',')]
    clmm_program_ids: Vec<String>,

    /// Treat every non-builtin program as CLMM
    #[arg(long, conflicts_with = "clmm_program_ids")]
    any_program: bool,

    #[arg(long, value_enum, default_value = "json-parsed")]
    tx_encoding: TxEncoding,

    /// Classify each top-level instruction by its own log segment
    #[arg(long)]
    per_instruction: bool,

    /// Save every fetched transaction as `<dir>/<signature>.json`
    #[arg(long, env = "RECORD_DIR")]
    record_dir: Option<PathBuf>,

    /// Serve transactions from recorded fixtures instead of the RPC node
    #[arg(long, env = "REPLAY_DIR", conflicts_with = "record_dir")]
    replay_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one transaction, classify it and decode its instructions
    Tx { signature: String },
    /// Page through a program's signature history
    Scan {
        program_id: String,
        /// Signatures per page
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Page request cap, 0 for no cap
        #[arg(long, default_value_t = 10)]
        max_pages: usize,
        /// Stop at this signature (exclusive)
        #[arg(long)]
        until: Option<String>,
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
        /// Only print log lines hitting AMM keywords
        #[arg(long)]
        logs_only: bool,
    },
    /// Decode a single instruction payload offline
    Decode {
        program_id: String,
        data: String,
        /// Layout to force, e.g. swap-v2; detected from the payload when omitted
        #[arg(long)]
        kind: Option<LayoutKind>,
        #[arg(long, value_enum, default_value = "base58")]
        encoding: PayloadEncoding,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TxEncoding {
    Json,
    JsonParsed,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PayloadEncoding {
    Base58,
    Base64,
    Hex,
}

impl PayloadEncoding {
    fn decode(&self, data: &str) -> AnyResult<Vec<u8>> {
        Ok(match self {
            PayloadEncoding::Base58 => bs58::decode(data).into_vec()?,
            PayloadEncoding::Base64 => base64::engine::general_purpose::STANDARD.decode(data)?,
            PayloadEncoding::Hex => hex::decode(data.trim_start_matches("0x"))?,
        })
    }
}

impl Cli {
    fn inspector_config(&self) -> AnyResult<InspectorConfig> {
        let level = CommitmentLevel::from_str(&self.commitment)
            .map_err(|_| anyhow!("无效的 commitment: {}", self.commitment))?;
        let clmm_program_ids = if self.any_program {
            Vec::new()
        } else if self.clmm_program_ids.is_empty() {
            DEFAULT_CLMM_PROGRAM_IDS.to_vec()
        } else {
            self.clmm_program_ids
                .iter()
                .map(|id| parse_address(id.trim()))
                .collect::<Result<Vec<_>, _>>()?
        };
        let encoding = match self.tx_encoding {
            TxEncoding::Json => UiTransactionEncoding::Json,
            TxEncoding::JsonParsed => UiTransactionEncoding::JsonParsed,
        };
        let mode = if self.per_instruction {
            ClassificationMode::PerInstruction
        } else {
            ClassificationMode::Transaction
        };

        Ok(InspectorConfig::new(self.rpc_url.clone(), CommitmentConfig { commitment: level })
            .with_clmm_program_ids(clmm_program_ids)
            .with_encoding(encoding)
            .with_classification_mode(mode)
            .with_record_dir(self.record_dir.clone()))
    }

    fn transaction_source(&self, config: &InspectorConfig) -> AnyResult<Arc<dyn TransactionSource>> {
        Ok(match &self.replay_dir {
            Some(dir) => {
                info!("从 {:?} 重放交易", dir);
                Arc::new(MockTransactionSource::from_fixture_dir(dir)?)
            }
            None => Arc::new(RpcTransactionSource::new(config)),
        })
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => result,
        _ = shutdown_signal() => {
            info!("收到退出信号，停止处理");
            Ok(())
        }
    }
}

async fn run(cli: Cli) -> AnyResult<()> {
    let config = cli.inspector_config()?;

    if let Command::Decode { program_id, data, kind, encoding } = &cli.command {
        let inspector = TxInspector::new(config, Arc::new(MockTransactionSource::new()));
        return decode_command(&inspector, program_id, data, *kind, *encoding);
    }

    let source = cli.transaction_source(&config)?;
    let inspector = TxInspector::new(config, source);
    let slot = inspector.health_check().await.context("无法连接 RPC 节点")?;
    info!("当前 slot: {}", slot);

    match cli.command {
        Command::Tx { signature } => match inspector.fetch_and_inspect(&signature).await? {
            Some(inspection) => inspection.log(),
            None => warn!("交易不存在: {}", signature),
        },
        Command::Scan { program_id, limit, max_pages, until, delay_ms, logs_only } => {
            let options = ScanOptions::new(parse_address(&program_id)?)
                .with_page_limit(limit)
                .with_max_pages((max_pages > 0).then_some(max_pages))
                .with_until(until)
                .with_page_delay(Duration::from_millis(delay_ms))
                .with_mode(if logs_only { ScanMode::LogsOnly } else { ScanMode::Decode });
            info!("扫描程序 {} 的签名历史", options.program_id);
            let summary = HistoryScanner::new(&inspector, options).run().await;
            summary.log();
        }
        Command::Decode { .. } => {}
    }
    Ok(())
}

fn decode_command(
    inspector: &TxInspector,
    program_id: &str,
    data: &str,
    kind: Option<LayoutKind>,
    encoding: PayloadEncoding,
) -> AnyResult<()> {
    let program_id = parse_address(program_id)?;
    let bytes = encoding.decode(data).context("无法解析指令数据")?;
    match inspector.decode_payload(&program_id, &bytes, kind) {
        Ok(Some(decoded)) => {
            info!("{}:\n{}", decoded.name(), serde_json::to_string_pretty(&decoded)?);
        }
        Ok(None) => warn!("没有适用于程序 {} 的布局 (data: {})", program_id, hex::encode(&bytes)),
        Err(e) => error!("解码失败: {}", e),
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("无法注册 SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
