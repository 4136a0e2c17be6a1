// error.rs — 错误类型模块
// 区分连接错误与其他错误：幻灯片循环只跳过连接错误

use thiserror::Error;

/// 程序运行期间可能出现的所有错误
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（无法定位程序目录、无法创建 HTTP 客户端等），不可重试
    #[error("configuration error: {0}")]
    Config(String),

    /// 连接层面的失败（无法建立连接或超时）
    #[error("connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// 其他 HTTP 错误，包括非 2xx 状态码
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Setter(#[from] SetterError),
}

impl From<reqwest::Error> for AppError {
    /// 按错误种类分流：连接/超时归为 Connection，其余归为 Http
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AppError::Connection(err)
        } else {
            AppError::Http(err)
        }
    }
}

/// 设置系统壁纸时的错误
#[derive(Debug, Error)]
pub enum SetterError {
    /// 没有匹配的桌面环境，且兜底工具 feh 也不存在
    #[error("desktop environment '{0}' is not supported, try installing feh")]
    UnsupportedDesktop(String),

    /// 外部命令启动失败或返回非零退出码
    #[error("`{program}` failed: {reason}")]
    Command { program: String, reason: String },

    /// 系统原生 API 调用失败（Windows）
    #[error("native wallpaper call failed: {0}")]
    Native(String),
}

impl SetterError {
    pub fn command(program: &str, reason: impl Into<String>) -> Self {
        SetterError::Command {
            program: program.to_string(),
            reason: reason.into(),
        }
    }
}
