//! 认证模块
//!
//! JWT 令牌服务 + 请求级用户上下文 + 角色中间件。
//! 身份信息只通过 [`CurrentUser`] 沿调用链传递，不读任何全局状态。

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_member, require_staff, require_superadmin};
