//! 交易分类器 - 基于日志内容判断指令类型
//!
//! 交易级别的分类采用"最后匹配的日志行获胜"：多条指令的交易会被归为最后一条出现的类型。
//! 需要逐条区分时使用 [`classify_top_level`]，它按顶层 `invoke [1]` 切分日志后分别分类。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 基于日志推断的指令类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionKind {
    Swap,
    AddLiquidity,
    RemoveLiquidity,
    CreatePool,
    InitializeReward,
    OpenPosition,
    #[default]
    Unknown,
}

impl InstructionKind {
    pub fn name(&self) -> &'static str {
        match self {
            InstructionKind::Swap => "Swap",
            InstructionKind::AddLiquidity => "AddLiquidity",
            InstructionKind::RemoveLiquidity => "RemoveLiquidity",
            InstructionKind::CreatePool => "CreatePool",
            InstructionKind::InitializeReward => "InitializeReward",
            InstructionKind::OpenPosition => "OpenPosition",
            InstructionKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 日志标记，按优先级排列（同一行内先匹配者获胜）
pub const LOG_MARKERS: [(&str, InstructionKind); 6] = [
    ("Instruction: SwapV2", InstructionKind::Swap),
    ("Instruction: IncreaseLiquidityV2", InstructionKind::AddLiquidity),
    ("Instruction: DecreaseLiquidityV2", InstructionKind::RemoveLiquidity),
    ("Instruction: CreatePool", InstructionKind::CreatePool),
    ("Instruction: InitializeReward", InstructionKind::InitializeReward),
    ("Instruction: OpenPosition", InstructionKind::OpenPosition),
];

/// 对单行日志分类
pub fn classify_line(line: &str) -> Option<InstructionKind> {
    LOG_MARKERS.iter().find(|(marker, _)| line.contains(marker)).map(|(_, kind)| *kind)
}

/// 对整笔交易的日志分类，最后一条匹配的日志行决定结果
pub fn classify_logs<S: AsRef<str>>(lines: &[S]) -> InstructionKind {
    lines
        .iter()
        .fold(InstructionKind::Unknown, |label, line| classify_line(line.as_ref()).unwrap_or(label))
}

/// 是否为顶层指令的调用行：`Program <id> invoke [1]`
pub fn is_top_level_invoke(line: &str) -> bool {
    line.starts_with("Program ") && line.ends_with(" invoke [1]")
}

/// 按顶层指令切分日志并分别分类
///
/// 第一条 `invoke [1]` 之前的日志被忽略；每个片段内部仍然是最后匹配获胜
pub fn classify_top_level<S: AsRef<str>>(lines: &[S]) -> Vec<InstructionKind> {
    let mut kinds = Vec::new();
    for line in lines.iter().map(|l| l.as_ref()) {
        if is_top_level_invoke(line) {
            kinds.push(InstructionKind::Unknown);
        } else if let (Some(current), Some(kind)) = (kinds.last_mut(), classify_line(line)) {
            *current = kind;
        }
    }
    kinds
}

/// 分类模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// 整笔交易使用同一个类型
    #[default]
    Transaction,
    /// 每条顶层指令使用其日志片段的类型
    PerInstruction,
}

/// AMM 日志关键字扫描的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmLogAction {
    Error,
    CreatePool,
    AddLiquidity,
    RemoveLiquidity,
    Swap,
}

impl AmmLogAction {
    pub fn name(&self) -> &'static str {
        match self {
            AmmLogAction::Error => "Error",
            AmmLogAction::CreatePool => "CreatePool",
            AmmLogAction::AddLiquidity => "AddLiquidity",
            AmmLogAction::RemoveLiquidity => "RemoveLiquidity",
            AmmLogAction::Swap => "Swap",
        }
    }
}

impl fmt::Display for AmmLogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const AMM_KEYWORDS: [(&str, AmmLogAction); 5] = [
    ("error", AmmLogAction::Error),
    ("initialize2", AmmLogAction::CreatePool),
    ("deposit", AmmLogAction::AddLiquidity),
    ("withdraw", AmmLogAction::RemoveLiquidity),
    ("swap", AmmLogAction::Swap),
];

/// 按关键字（不区分大小写）识别单行 AMM 日志
pub fn classify_amm_log_line(line: &str) -> Option<AmmLogAction> {
    let lower = line.to_lowercase();
    AMM_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, action)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_within_line() {
        // 同一行同时出现两个标记时取优先级高者
        let line = "Program log: Instruction: CreatePool then Instruction: SwapV2";
        assert_eq!(classify_line(line), Some(InstructionKind::Swap));
    }

    #[test]
    fn test_increase_liquidity_does_not_hit_swap() {
        assert_eq!(
            classify_line("Program log: Instruction: IncreaseLiquidityV2"),
            Some(InstructionKind::AddLiquidity)
        );
        assert_eq!(classify_line("Program log: Instruction: Swap"), None);
    }

    #[test]
    fn test_top_level_invoke() {
        assert!(is_top_level_invoke(
            "Program CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK invoke [1]"
        ));
        assert!(!is_top_level_invoke(
            "Program TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA invoke [2]"
        ));
    }

    #[test]
    fn test_amm_keywords_case_insensitive() {
        assert_eq!(classify_amm_log_line("Program log: SWAP done"), Some(AmmLogAction::Swap));
        assert_eq!(
            classify_amm_log_line("Program log: Error: deposit failed"),
            Some(AmmLogAction::Error)
        );
        assert_eq!(classify_amm_log_line("Program log: nothing"), None);
    }
}
