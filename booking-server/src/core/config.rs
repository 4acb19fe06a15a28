use std::path::PathBuf;
use std::time::Duration;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DATABASE_NAMESPACE | booking | SurrealDB namespace |
/// | DATABASE_NAME | main | SurrealDB database |
/// | TELEGRAM_BOT_TOKEN | (无) | Bot token；未设置时 bot 关闭，通知只写日志 |
/// | TELEGRAM_ADMIN_CHAT_ID | 0 | 接收审批消息的管理员会话 |
/// | WEB_APP_URL | (无) | Mini-app 地址 (注册完成后的按钮) |
/// | CORS_ORIGIN | (无) | 允许的来源；未设置时放开 |
/// | NOTIFY_TIMEOUT_MS | 5000 | 单次通知调用超时 (毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录；存在时写入按天滚动的文件 |
///
/// # 示例
///
/// ```ignore
/// TELEGRAM_BOT_TOKEN=123:abc TELEGRAM_ADMIN_CHAT_ID=42 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub database_namespace: String,
    pub database_name: String,
    pub telegram_bot_token: Option<String>,
    pub admin_chat_id: i64,
    pub web_app_url: Option<String>,
    pub cors_origin: Option<String>,
    pub notify_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            database_namespace: std::env::var("DATABASE_NAMESPACE")
                .unwrap_or_else(|_| "booking".into()),
            database_name: std::env::var("DATABASE_NAME").unwrap_or_else(|_| "main".into()),
            telegram_bot_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
            admin_chat_id: std::env::var("TELEGRAM_ADMIN_CHAT_ID")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            web_app_url: non_empty_var("WEB_APP_URL"),
            cors_origin: non_empty_var("CORS_ORIGIN"),
            notify_timeout_ms: std::env::var("NOTIFY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: non_empty_var("LOG_DIR"),
        }
    }

    /// 测试用配置：不读环境变量，bot 关闭
    pub fn for_tests(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            environment: "test".into(),
            database_namespace: "test".into(),
            database_name: "test".into(),
            telegram_bot_token: None,
            admin_chat_id: 1,
            web_app_url: None,
            cors_origin: None,
            notify_timeout_ms: 1000,
            log_level: "debug".into(),
            log_dir: None,
        }
    }

    /// 数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }

    /// 是否配置了 bot
    pub fn bot_enabled(&self) -> bool {
        self.telegram_bot_token.is_some()
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
