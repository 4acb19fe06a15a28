use std::sync::Arc;

use shared::AppError;
use teloxide::Bot;

use crate::bookings::{BookingManager, LogNotifier, ManagerSettings, Notifier};
use crate::bot::TelegramNotifier;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{BookingRepository, ShopRepository, UserRepository};
use crate::discovery::DiscoveryEngine;
use crate::store::{BookingStore, ShopCatalog, UserStore};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求 clone 一份成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | bookings / shops / users | 存储 trait 对象 |
/// | manager | 预约生命周期 |
/// | discovery | 店铺发现与排序 |
/// | bot | Telegram bot (未配置 token 时为 None) |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub bookings: Arc<dyn BookingStore>,
    pub shops: Arc<dyn ShopCatalog>,
    pub users: Arc<dyn UserStore>,
    pub manager: Arc<BookingManager>,
    pub discovery: Arc<DiscoveryEngine>,
    pub bot: Option<Bot>,
}

impl ServerState {
    /// 打开数据库并装配所有服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::open(
            config.database_dir(),
            &config.database_namespace,
            &config.database_name,
        )
        .await?;

        let bot = config.telegram_bot_token.as_deref().map(Bot::new);
        let notifier: Arc<dyn Notifier> = match &bot {
            Some(bot) => Arc::new(TelegramNotifier::new(bot.clone())),
            None => {
                tracing::warn!("TELEGRAM_BOT_TOKEN not set, notifications are only logged");
                Arc::new(LogNotifier::new())
            }
        };

        let mut state = Self::from_parts(
            config.clone(),
            Arc::new(BookingRepository::new(db.db.clone())),
            Arc::new(ShopRepository::new(db.db.clone())),
            Arc::new(UserRepository::new(db.db)),
            notifier,
        );
        state.bot = bot;
        Ok(state)
    }

    /// 由已有组件装配 (测试)
    pub fn from_parts(
        config: Config,
        bookings: Arc<dyn BookingStore>,
        shops: Arc<dyn ShopCatalog>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let manager = Arc::new(BookingManager::new(
            bookings.clone(),
            shops.clone(),
            notifier,
            ManagerSettings {
                admin_chat_id: config.admin_chat_id,
                notify_timeout: config.notify_timeout(),
            },
        ));
        let discovery = Arc::new(DiscoveryEngine::new(shops.clone()));

        Self {
            config,
            bookings,
            shops,
            users,
            manager,
            discovery,
            bot: None,
        }
    }
}
