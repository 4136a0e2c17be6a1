// config.rs — 配置管理模块
// 不读取配置文件，优先级：命令行参数 > 环境变量 > 默认值

use crate::error::AppError;
use crate::source::unsplash::BASE_URL;
use shellexpand::full; // 用于展开 ~ 和环境变量
use std::env; // 环境变量模块
use std::path::{Path, PathBuf}; // 路径处理类型

/// 覆盖壁纸文件位置的环境变量
pub const WALLPAPER_ENV: &str = "SPLASHPAPER_WALLPAPER";
/// 覆盖 Unsplash Source 地址的环境变量
pub const BASE_URL_ENV: &str = "SPLASHPAPER_BASE_URL";

/// 默认壁纸文件名，位于程序所在目录
const WALLPAPER_FILE: &str = "wallpaper.jpg";

/// 展开路径中的 ~ 和环境变量 ($HOME, ${XDG_PICTURES_DIR} 等)
/// 无法展开的变量保留原样
fn expand_path(path_str: &str) -> PathBuf {
    let expanded = full(path_str)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path_str.to_string());
    PathBuf::from(expanded)
}

/// 应用全局配置项
#[derive(Debug)]
pub struct AppConfig {
    /// 壁纸文件路径，每轮下载都会覆盖它
    pub wallpaper_path: PathBuf,
    /// Unsplash Source 基础 URL
    pub base_url: String,
}

impl AppConfig {
    /// 初始化配置
    ///
    /// # 参数
    /// - `output`: 命令行中指定的壁纸文件路径（可选）
    pub fn new(output: Option<&str>) -> Result<Self, AppError> {
        let env_output = env::var(WALLPAPER_ENV).ok().filter(|s| !s.is_empty());
        let env_base_url = env::var(BASE_URL_ENV).ok().filter(|s| !s.is_empty());

        let wallpaper_path = match output.map(str::to_string).or(env_output) {
            Some(path) => absolutize(&expand_path(&path))?,
            None => Self::default_wallpaper_path()?,
        };

        Ok(Self {
            wallpaper_path,
            base_url: resolve_base_url(env_base_url),
        })
    }

    /// 程序所在目录下的 wallpaper.jpg
    fn default_wallpaper_path() -> Result<PathBuf, AppError> {
        let exe = env::current_exe()
            .map_err(|e| AppError::Config(format!("cannot locate executable: {e}")))?;
        let dir = exe
            .parent()
            .ok_or_else(|| AppError::Config(format!("{} has no parent", exe.display())))?;
        Ok(dir.join(WALLPAPER_FILE))
    }

    /// 构建请求使用的 User-Agent
    ///
    /// 幻灯片模式下附带间隔秒数
    pub fn user_agent(interval: u64) -> String {
        let mut agent = format!("splashpaper/{}", env!("CARGO_PKG_VERSION"));
        if interval > 0 {
            agent.push_str(&format!(" interval:{interval}"));
        }
        agent
    }

    /// 确保壁纸文件所在目录存在
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.wallpaper_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

fn resolve_base_url(from_env: Option<String>) -> String {
    from_env
        .as_deref()
        .unwrap_or(BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

/// 相对路径相对于当前工作目录；桌面环境需要绝对路径
fn absolutize(path: &Path) -> Result<PathBuf, AppError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir()
        .map_err(|e| AppError::Config(format!("cannot read working directory: {e}")))?;
    Ok(cwd.join(path))
}
