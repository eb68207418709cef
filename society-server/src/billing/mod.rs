//! 账务核心模块
//!
//! 收据编号、一次性会费摊销、付款汇总三块业务规则。
//! 计算都是读侧逻辑：编号生成只读不写，摊销与汇总是纯函数。

pub mod fee_adjustment;
pub mod payment_summary;
pub mod receipt_number;

pub use fee_adjustment::{MEMBERSHIP_BREAKDOWN, TOTAL_MEMBERSHIP_FEE, adjust_breakdown};
pub use payment_summary::summarize;
pub use receipt_number::generate_receipt_number;
