//! 操作人上下文

use serde::{Deserialize, Serialize};

/// 执行保存的用户与团队，显式传入保存流程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingContext {
    pub user: String,
    pub team: String,
}

impl ActingContext {
    pub fn new(user: &str, team: &str) -> Self {
        Self {
            user: user.to_string(),
            team: team.to_string(),
        }
    }

    /// 未携带身份信息时使用
    pub fn system() -> Self {
        Self::new("system", "-")
    }
}

impl Default for ActingContext {
    fn default() -> Self {
        Self::system()
    }
}
