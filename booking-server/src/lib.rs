//! Booking Server - 理发店/美容店预约平台后端
//!
//! # 架构概述
//!
//! - **预约生命周期** (`bookings`): pending → confirmed / rejected / cancelled，
//!   管理员通过 Telegram 审批
//! - **店铺发现** (`discovery`): 过滤、距离、排序、分页、发现页分区
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **Telegram** (`bot`): 注册、审批按钮、拒绝理由
//! - **HTTP API** (`api`): mini-app 使用的 JSON 接口
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── store/         # 存储 trait
//! ├── db/            # SurrealDB 实现
//! ├── bookings/      # 预约状态机与通知
//! ├── discovery/     # 排序引擎
//! ├── auth/          # Telegram WebApp 签名
//! ├── bot/           # teloxide 适配
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod auth;
pub mod bookings;
pub mod bot;
pub mod core;
pub mod db;
pub mod discovery;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export 公共类型
pub use bookings::{BookingManager, Notifier};
pub use core::{Config, Server, ServerState};
pub use discovery::DiscoveryEngine;
pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 .env、创建工作目录并初始化日志
pub fn setup_environment() -> std::io::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    init_logger_with_file(
        Some(&config.log_level),
        config.is_production(),
        config.log_dir.as_deref(),
    );
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____              __   _
   / __ )____  ____  / /__(_)___  ____ _
  / __  / __ \/ __ \/ //_/ / __ \/ __ `/
 / /_/ / /_/ / /_/ / ,< / / / / / /_/ /
/_____/\____/\____/_/|_/_/_/ /_/\__, /
                               /____/
    "#
    );
}
