// main.rs — 程序入口
// 负责初始化多语言与日志、解析命令行参数、分发子命令

mod cli; // 声明 cli 模块，对应 src/cli.rs
mod config; // 声明 config 模块，对应 src/config.rs
mod cycle; // 声明 cycle 模块，对应 src/cycle.rs
mod error; // 声明 error 模块，对应 src/error.rs
mod setter; // 声明 setter 模块，对应 src/setter.rs
mod source; // 声明 source 模块，对应 src/source/mod.rs

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales", fallback = "en");

use clap::{CommandFactory, Parser}; // 引入 Parser trait 的 parse() 方法; CommandFactory 用于生成补全脚本
use clap_complete::generate; // 引入补全脚本生成函数
use cli::{Cli, Commands}; // 引入 CLI 结构体和子命令枚举
use config::AppConfig; // 引入应用配置
use cycle::Slideshow;
use rust_i18n::t; // 引入翻译宏
use setter::{PlatformInfo, SystemHost};
use source::unsplash::{UnsplashClient, select_url};
use source::{Options, Preset};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// `#[tokio::main]` 宏将 async main 转换为同步 main + tokio 运行时
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    // 解析命令行参数
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let options = cli.source.to_options();

    // 根据子命令分发执行逻辑
    match &cli.command {
        None => {
            let config = AppConfig::new(cli.output.as_deref())?;
            config.ensure_dirs()?;
            handle_set(&config, &options).await?;
        }

        Some(Commands::Url) => {
            let config = AppConfig::new(cli.output.as_deref())?;
            let url = select_url(&options, &config.base_url, &mut rand::thread_rng());
            println!("{url}");
        }

        Some(Commands::Apply { image }) => {
            handle_apply(image)?;
        }

        Some(Commands::Presets) => {
            handle_presets();
        }

        Some(Commands::Completions { shell }) => {
            generate(
                *shell,
                &mut Cli::command(),
                "splashpaper",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// 诊断日志写到 stderr；RUST_LOG 优先，否则默认 warn，-v 时为 debug
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 默认行为：下载并设置壁纸，指定 interval 时进入幻灯片模式
async fn handle_set(config: &AppConfig, options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let client = UnsplashClient::new(&AppConfig::user_agent(options.interval))?;
    let platform = PlatformInfo::detect();
    let host = SystemHost;

    if options.interval > 0 {
        println!("{}", t!("slideshow_start", interval => options.interval));
    }

    let slideshow = Slideshow {
        options,
        base_url: &config.base_url,
        wallpaper_path: &config.wallpaper_path,
        platform: &platform,
        fetcher: &client,
        host: &host,
    };
    slideshow.run().await?;

    Ok(())
}

/// 处理 apply 子命令：把本地图片设为壁纸
fn handle_apply(image: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(image);
    if !path.is_file() {
        return Err(t!("error_not_found", path => image).into());
    }
    let path = std::path::absolute(path)?;

    println!("{}", t!("setting_wallpaper"));
    println!("  -> {}", path.display());
    setter::apply_wallpaper(&SystemHost, &PlatformInfo::detect(), &path)?;
    println!("{}", t!("set_done"));
    Ok(())
}

/// 处理 presets 子命令：列出所有预设
fn handle_presets() {
    println!("{}", t!("presets_title"));
    println!("{}", "-".repeat(30));
    for preset in <Preset as clap::ValueEnum>::value_variants() {
        println!("  {:<12}{}", preset.name(), preset.collection_id());
    }
}
