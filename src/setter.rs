// setter.rs — 系统壁纸设置模块
// 根据操作系统与桌面环境，调用对应的机制把本地图片设为桌面背景

use crate::error::SetterError;
use std::env;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// 操作系统家族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
    /// 未识别的系统，按 Linux 方式尽力处理
    Unknown,
}

impl OsFamily {
    /// 从 `std::env::consts::OS` 的取值映射
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            "linux" | "android" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => OsFamily::Linux,
            _ => OsFamily::Unknown,
        }
    }
}

/// 平台信息，由调用方注入，测试时可以直接构造
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub os: OsFamily,
    /// `DESKTOP_SESSION` 环境变量的值
    pub desktop_session: Option<String>,
}

impl PlatformInfo {
    /// 读取当前进程的系统类型与桌面会话，进程启动时调用一次即可
    pub fn detect() -> Self {
        Self {
            os: OsFamily::from_os(env::consts::OS),
            desktop_session: env::var("DESKTOP_SESSION").ok(),
        }
    }
}

/// 平铺式窗口管理器，统一用 feh 设置背景
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilingWm {
    I3,
    Bspwm,
    Awesome,
}

/// 桌面会话的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopSession {
    Xfce,
    Lxde,
    GnomeLike,
    Cinnamon,
    Mate,
    Tiling(TilingWm),
    Sway,
    Unknown,
}

/// 匹配规则按顺序检查，先命中者生效
/// （"xubuntu"/"lubuntu" 都包含 "ubuntu"，必须排在 GNOME 之前）
const SESSION_RULES: &[(&[&str], DesktopSession)] = &[
    (&["xfce", "xubuntu"], DesktopSession::Xfce),
    (&["lubuntu", "lxde"], DesktopSession::Lxde),
    (&["cinnamon"], DesktopSession::Cinnamon),
    (
        &["gnome", "unity", "ubuntu", "pantheon", "budgie"],
        DesktopSession::GnomeLike,
    ),
    (&["mate"], DesktopSession::Mate),
    (&["i3"], DesktopSession::Tiling(TilingWm::I3)),
    (&["bspwm"], DesktopSession::Tiling(TilingWm::Bspwm)),
    (&["awesome"], DesktopSession::Tiling(TilingWm::Awesome)),
    (&["sway"], DesktopSession::Sway),
];

impl DesktopSession {
    /// 把会话字符串（不区分大小写）映射为分类，只做子串匹配，不产生副作用
    pub fn classify(session: &str) -> Self {
        let session = session.to_lowercase();
        SESSION_RULES
            .iter()
            .find(|(keys, _)| keys.iter().any(|key| session.contains(key)))
            .map(|(_, de)| *de)
            .unwrap_or(DesktopSession::Unknown)
    }
}

/// 外部命令的执行结果
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// 操作系统能力的抽象，真实实现见 [`SystemHost`]
pub trait Host {
    /// 执行外部命令并捕获输出；程序不存在时返回 `io::ErrorKind::NotFound`
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;

    /// 程序是否在 PATH 中
    fn has_command(&self, program: &str) -> bool;

    /// 调用系统原生接口设置壁纸（Windows）
    fn set_native(&self, path: &Path) -> Result<(), SetterError>;
}

/// 直接作用于当前系统的 Host
pub struct SystemHost;

impl Host for SystemHost {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn has_command(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn set_native(&self, path: &Path) -> Result<(), SetterError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| SetterError::Native(format!("non UTF-8 path {}", path.display())))?;

        // wallpaper 库在 Windows 上调用 SystemParametersInfoW，
        // 并带上 SPIF_UPDATEINIFILE | SPIF_SENDCHANGE，立即生效且持久保存
        wallpaper::set_from_path(path_str).map_err(|e| SetterError::Native(e.to_string()))
    }
}

/// 将指定路径的图片设置为系统壁纸
///
/// # 参数
/// - `host`: 执行命令的系统能力
/// - `platform`: 系统类型与桌面会话
/// - `path`: 图片的绝对路径
pub fn apply_wallpaper(
    host: &dyn Host,
    platform: &PlatformInfo,
    path: &Path,
) -> Result<(), SetterError> {
    debug!(os = ?platform.os, session = ?platform.desktop_session, path = %path.display(), "applying wallpaper");

    if platform.os == OsFamily::Windows {
        return host.set_native(path);
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| SetterError::command("setter", format!("non UTF-8 path {}", path.display())))?;

    match platform.os {
        OsFamily::MacOs => set_macos(host, path_str),
        _ => set_linux(host, platform.desktop_session.as_deref(), path_str),
    }
}

fn set_macos(host: &dyn Host, path: &str) -> Result<(), SetterError> {
    let script = format!(
        r#"tell application "Finder" to set desktop picture to POSIX file "{path}""#
    );
    run_checked(host, "osascript", &["-e", script.as_str()])?;
    // 重启 Dock 让新壁纸立即显示
    run_checked(host, "killall", &["Dock"])?;
    Ok(())
}

fn set_linux(host: &dyn Host, session: Option<&str>, path: &str) -> Result<(), SetterError> {
    let session = session.map(str::trim).unwrap_or("");

    if session.is_empty() {
        if host.has_command("termux-wallpaper") {
            return set_termux(host, path);
        }
        return set_fallback(host, session, path);
    }

    match DesktopSession::classify(session) {
        DesktopSession::Xfce => set_xfce(host, path),
        DesktopSession::Lxde => run_checked(host, "pcmanfm", &["-w", path]).map(drop),
        DesktopSession::GnomeLike => set_gnome(host, path),
        DesktopSession::Cinnamon => {
            let uri = file_uri(path);
            run_checked(
                host,
                "gsettings",
                &["set", "org.cinnamon.desktop.background", "picture-uri", uri.as_str()],
            )
            .map(drop)
        }
        DesktopSession::Mate => {
            let value = format!("'{path}'");
            run_checked(
                host,
                "gsettings",
                &["set", "org.mate.background", "picture-filename", value.as_str()],
            )
            .map(drop)
        }
        DesktopSession::Tiling(_) => run_checked(host, "feh", &["--bg-center", path]).map(drop),
        DesktopSession::Sway => {
            let message = format!("output * bg {path} fill");
            run_checked(host, "swaymsg", &[message.as_str()]).map(drop)
        }
        DesktopSession::Unknown => set_fallback(host, session, path),
    }
}

/// XFCE 每个显示器各有一个 last-image 属性，逐个设置
fn set_xfce(host: &dyn Host, path: &str) -> Result<(), SetterError> {
    let listing = run_checked(host, "xfconf-query", &["-c", "xfce4-desktop", "-l"])?;
    let properties: Vec<&str> = listing
        .lines()
        .map(str::trim)
        .filter(|line| line.contains("last-image"))
        .collect();

    if properties.is_empty() {
        warn!("xfconf-query listed no last-image properties");
        return Err(SetterError::command(
            "xfconf-query",
            "no last-image properties in xfce4-desktop",
        ));
    }

    // 某个显示器失败不影响其他显示器，最后返回第一个错误
    let mut first_error = None;
    for property in properties {
        let result = run_checked(
            host,
            "xfconf-query",
            &["-c", "xfce4-desktop", "-p", property, "-s", path],
        );
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn set_gnome(host: &dyn Host, path: &str) -> Result<(), SetterError> {
    let uri = file_uri(path);
    run_checked(
        host,
        "gsettings",
        &["set", "org.gnome.desktop.background", "picture-uri", uri.as_str()],
    )?;

    // 旧版 GNOME 没有 picture-uri-dark，失败只记录不报错
    let dark = host.run(
        "gsettings",
        &["set", "org.gnome.desktop.background", "picture-uri-dark", uri.as_str()],
    );
    if !matches!(dark, Ok(ref out) if out.success) {
        debug!("picture-uri-dark not updated");
    }
    Ok(())
}

/// Termux 环境：同时设置桌面与锁屏
fn set_termux(host: &dyn Host, path: &str) -> Result<(), SetterError> {
    run_checked(host, "termux-wallpaper", &["-f", path])?;
    run_checked(host, "termux-wallpaper", &["-f", path, "-l"])?;
    Ok(())
}

/// 兜底：尝试 feh，feh 不存在时报告桌面环境不受支持
fn set_fallback(host: &dyn Host, session: &str, path: &str) -> Result<(), SetterError> {
    match host.run("feh", &["--bg-center", path]) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let name = if session.is_empty() { "<unset>" } else { session };
            Err(SetterError::UnsupportedDesktop(name.to_string()))
        }
        result => check("feh", result).map(drop),
    }
}

/// 执行命令，失败时记录日志并返回错误；成功时返回标准输出
fn run_checked(host: &dyn Host, program: &str, args: &[&str]) -> Result<String, SetterError> {
    debug!(program, ?args, "running");
    check(program, host.run(program, args))
}

fn check(program: &str, result: io::Result<CommandOutput>) -> Result<String, SetterError> {
    match result {
        Ok(output) if output.success => Ok(output.stdout),
        Ok(output) => {
            let stderr = output.stderr.trim();
            let reason = if stderr.is_empty() {
                "exited with non-zero status".to_string()
            } else {
                stderr.to_string()
            };
            warn!(program, %reason, "wallpaper command failed");
            Err(SetterError::command(program, reason))
        }
        Err(e) => {
            warn!(program, error = %e, "wallpaper command could not start");
            Err(SetterError::command(program, e.to_string()))
        }
    }
}

fn file_uri(path: &str) -> String {
    format!("file://{path}")
}
