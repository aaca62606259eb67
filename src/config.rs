use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};

#[derive(Args, Clone, Debug, Serialize, Deserialize)]
pub struct CoverConfig {
    /// cover clauses with the cheap watcher scan instead of the exact greedy passes
    #[arg(long = "fast-partial", default_value_t = false)]
    pub fast_partial: bool,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            fast_partial: false,
        }
    }
}

#[derive(Args, Clone, Debug, Serialize, Deserialize)]
pub struct FlowConfig {
    /// cross-check every recomputed flow against a from-scratch reference (debug builds only)
    #[arg(long = "double-check", action = ArgAction::Set, default_value_t = false)]
    pub double_check: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            double_check: false,
        }
    }
}
