//! 奖励评估结果

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 奖励引擎评估结果（归一化后）
///
/// 仅作参考：折扣最终如何作用于订单金额由下单流程决定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsOutcome {
    pub discount: Decimal,
    pub applied_campaigns: Vec<String>,
    pub loyalty_points_used: i32,
    pub loyalty_points_earned: i32,
}
