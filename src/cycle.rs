// cycle.rs — 单轮执行与幻灯片循环
// 每轮依次完成：挑选 URL → 下载到壁纸文件 → 设置为系统壁纸，轮与轮之间不重叠

use crate::error::{AppError, SetterError};
use crate::setter::{self, Host, PlatformInfo};
use crate::source::unsplash::select_url;
use crate::source::{ImageFetcher, Options};
use rust_i18n::t;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// 一次运行所需的全部协作者
pub struct Slideshow<'a, F: ?Sized> {
    pub options: &'a Options,
    pub base_url: &'a str,
    /// 固定的壁纸文件，每轮覆盖
    pub wallpaper_path: &'a Path,
    pub platform: &'a PlatformInfo,
    pub fetcher: &'a F,
    pub host: &'a dyn Host,
}

impl<F: ImageFetcher + ?Sized> Slideshow<'_, F> {
    /// 执行一轮，返回本轮请求的 URL
    pub async fn cycle(&self) -> Result<String, AppError> {
        let url = select_url(self.options, self.base_url, &mut rand::thread_rng());
        println!("{}", t!("fetching", url => url));

        self.fetcher.fetch_to(&url, self.wallpaper_path).await?;
        println!("{}", t!("save_path", path => self.wallpaper_path.display()));

        println!("{}", t!("setting_wallpaper"));
        setter::apply_wallpaper(self.host, self.platform, self.wallpaper_path)?;
        println!("{}", t!("set_done"));

        Ok(url)
    }

    /// interval 为 0 时只执行一轮，错误直接返回；
    /// 否则无限循环，可恢复的错误跳过本轮
    pub async fn run(&self) -> Result<(), AppError> {
        let interval = self.options.interval;
        if interval == 0 {
            return self.cycle().await.map(drop);
        }

        info!(interval, "slideshow started");
        loop {
            let result = self.cycle().await;
            after_cycle(result.map(drop))?;
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    }
}

/// 幻灯片模式下决定一轮的结果是否致命
///
/// - 连接错误：提示后跳过本轮
/// - 外部命令失败：记录警告后跳过本轮
/// - 桌面环境不受支持、配置错误、其他 HTTP/IO 错误：终止
pub fn after_cycle(result: Result<(), AppError>) -> Result<(), AppError> {
    match result {
        Ok(()) => Ok(()),
        Err(AppError::Connection(e)) => {
            warn!(error = %e, "connection failed");
            println!("{}", t!("connection_skip"));
            Ok(())
        }
        Err(AppError::Setter(e @ SetterError::Command { .. })) => {
            warn!(error = %e, "wallpaper not applied this cycle");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
