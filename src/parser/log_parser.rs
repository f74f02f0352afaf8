//! 日志解析 - 从程序日志中提取流动性参数

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static LIQUIDITY_LOG: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"liquidity: (\d+), amount_0_max: (\d+), amount_1_max: (\d+), tick_lower_index: (-?\d+), tick_upper_index: (-?\d+), tick_array_lower_start_index: (-?\d+), tick_array_upper_start_index: (-?\d+)",
    )
    .ok()
});

/// 开仓/加仓日志中的流动性参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidityLogInfo {
    pub liquidity: u128,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub tick_array_lower_start_index: i32,
    pub tick_array_upper_start_index: i32,
}

/// 解析单行日志，格式不符或数值溢出时返回 None
pub fn parse_liquidity_log(line: &str) -> Option<LiquidityLogInfo> {
    let caps = LIQUIDITY_LOG.as_ref()?.captures(line)?;
    Some(LiquidityLogInfo {
        liquidity: caps[1].parse().ok()?,
        amount_0_max: caps[2].parse().ok()?,
        amount_1_max: caps[3].parse().ok()?,
        tick_lower_index: caps[4].parse().ok()?,
        tick_upper_index: caps[5].parse().ok()?,
        tick_array_lower_start_index: caps[6].parse().ok()?,
        tick_array_upper_start_index: caps[7].parse().ok()?,
    })
}

/// 返回第一条可解析的流动性日志
pub fn find_liquidity_info<S: AsRef<str>>(logs: &[S]) -> Option<LiquidityLogInfo> {
    logs.iter().find_map(|line| parse_liquidity_log(line.as_ref()))
}
