// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义来源、修饰参数和子命令

use crate::source::{Modifiers, Options, Preset, Sources};
use clap::{Args, Parser, Subcommand}; // Parser: 解析命令行参数的 trait; Subcommand: 定义子命令的 trait
use clap_complete::Shell; // Shell 枚举：Bash, Zsh, Fish, Elvish, PowerShell

/// 壁纸管理工具，图片来自 Unsplash
///
/// 可以同时指定任意多个来源，每次随机从中挑选一个；
/// 未指定任何来源时获取一张随机图片。
#[derive(Parser)]
#[command(name = "splashpaper")]
#[command(version)] // 自动从 Cargo.toml 读取 version 字段
#[command(author)]
#[command(about = "Set a wallpaper or wallpaper slideshow from unsplash.com")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    /// 壁纸文件保存路径（默认为程序所在目录下的 wallpaper.jpg）
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 来源与修饰参数
///
/// 用法示例:
///   splashpaper -u erondu -u aditya1702 --featured
///   splashpaper -s nature -s night -r 1920x1080 -i 600
///   splashpaper -p dark -p city --weekly
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// 幻灯片间隔（秒），不指定则设置一次后退出
    #[arg(short, long, default_value_t = 0, value_name = "SECONDS")]
    pub interval: u64,

    /// 屏幕分辨率 (WIDTHxHEIGHT)，建议指定以下载更小的图片
    #[arg(short, long, value_name = "WxH")]
    pub resolution: Option<String>,

    /// 从这些用户点赞过的图片中挑选
    #[arg(short, long, value_name = "USER", value_delimiter = ',')]
    pub likes: Vec<String>,

    /// 从这些用户上传的图片中挑选
    #[arg(short, long, value_name = "USER", value_delimiter = ',')]
    pub users: Vec<String>,

    /// 收藏集 ID
    #[arg(short, long, value_name = "ID", value_delimiter = ',')]
    pub collections: Vec<String>,

    /// 搜索关键词，可包含空格和逗号，多个关键词请重复 -s
    #[arg(short, long, value_name = "TERM")]
    pub search: Vec<String>,

    /// 使用命名的预设收藏集
    #[arg(short, long, value_enum, value_name = "PRESET", value_delimiter = ',')]
    pub presets: Vec<Preset>,

    /// 每日精选图片（会被 --weekly 覆盖）
    #[arg(long)]
    pub daily: bool,

    /// 每周精选图片（优先于 --daily）
    #[arg(long)]
    pub weekly: bool,

    /// 只使用编辑精选的图片
    #[arg(long)]
    pub featured: bool,
}

impl SourceArgs {
    /// 转换为运行选项
    pub fn to_options(&self) -> Options {
        Options {
            sources: Sources {
                likes: self.likes.clone(),
                users: self.users.clone(),
                collections: self.collections.clone(),
                search: self.search.clone(),
            },
            presets: self.presets.clone(),
            modifiers: Modifiers {
                daily: self.daily,
                weekly: self.weekly,
                featured: self.featured,
                resolution: self.resolution.clone().filter(|r| !r.is_empty()),
            },
            interval: self.interval,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// 只打印本次会请求的 URL，不下载
    ///
    /// 用法示例:
    ///   splashpaper -p nature --daily url
    Url,

    /// 将本地指定的图片设置为系统壁纸
    ///
    /// 用法示例:
    ///   splashpaper apply image.jpg
    Apply {
        /// 图片的本地路径
        image: String,
    },

    /// 列出所有预设及其收藏集 ID
    Presets,

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   splashpaper completions zsh > ~/.zsh/completions/_splashpaper
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },
}
