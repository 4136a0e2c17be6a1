// source/mod.rs — 壁纸源模块入口
pub mod unsplash;

// 定义壁纸来源的选项结构与下载能力的抽象 Trait

use crate::error::AppError;
use async_trait::async_trait; // 异步 Trait 支持宏
use clap::ValueEnum;
use std::path::Path;

/// 预设：名称到 Unsplash 收藏集 ID 的固定映射
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Dark,
    Light,
    Wallpapers,
    Abstract,
    Nature,
    Night,
    City,
}

impl Preset {
    /// 预设对应的收藏集 ID
    pub fn collection_id(self) -> &'static str {
        match self {
            Preset::Dark => "22546183",
            Preset::Light => "26962183",
            Preset::Wallpapers => "9943257",
            Preset::Abstract => "85975240",
            Preset::Nature => "gQEu_f91tVg",
            Preset::Night => "4PnUeTAlD1s",
            Preset::City => "vY-yVNran8c",
        }
    }

    /// 命令行中使用的预设名称
    pub fn name(self) -> &'static str {
        match self {
            Preset::Dark => "dark",
            Preset::Light => "light",
            Preset::Wallpapers => "wallpapers",
            Preset::Abstract => "abstract",
            Preset::Nature => "nature",
            Preset::Night => "night",
            Preset::City => "city",
        }
    }
}

/// 来源类别，决定最终 URL 的形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// 某个用户点赞过的图片
    Likes,
    /// 某个用户上传的图片
    Users,
    /// 收藏集（含预设解析出的 ID）
    Collections,
    /// 搜索关键词，以查询字符串形式追加
    Search,
}

/// 用户指定的四类来源，每类都可以为空
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub likes: Vec<String>,
    pub users: Vec<String>,
    pub collections: Vec<String>,
    pub search: Vec<String>,
}

/// 修饰参数
///
/// daily 与 weekly 可以同时保存为 true，构建 URL 时 weekly 优先
#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    pub daily: bool,
    pub weekly: bool,
    pub featured: bool,
    /// WIDTHxHEIGHT 形式，原样传给远端，不做校验
    pub resolution: Option<String>,
}

/// 一次运行的完整选项，构建后不再修改
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub sources: Sources,
    pub presets: Vec<Preset>,
    pub modifiers: Modifiers,
    /// 幻灯片间隔（秒），0 表示只运行一次
    pub interval: u64,
}

impl Options {
    /// 构建四个候选池，预设解析后追加到 collections 末尾
    pub fn pools(&self) -> [(Category, Vec<&str>); 4] {
        let collections = self
            .sources
            .collections
            .iter()
            .map(String::as_str)
            .chain(self.presets.iter().map(|p| p.collection_id()))
            .collect();

        [
            (Category::Likes, as_strs(&self.sources.likes)),
            (Category::Users, as_strs(&self.sources.users)),
            (Category::Collections, collections),
            (Category::Search, as_strs(&self.sources.search)),
        ]
    }
}

fn as_strs(list: &[String]) -> Vec<&str> {
    list.iter().map(String::as_str).collect()
}

/// 图片下载能力的抽象 Trait
///
/// 把远端资源完整写入 `dest`，覆盖已有内容。
/// 连接层面的失败必须以 `AppError::Connection` 返回，循环据此跳过本轮。
#[async_trait]
pub trait ImageFetcher {
    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_append_after_user_collections() {
        let options = Options {
            sources: Sources {
                collections: vec!["123".to_string()],
                ..Default::default()
            },
            presets: vec![Preset::Dark, Preset::City],
            ..Default::default()
        };

        let pools = options.pools();
        let (category, collections) = &pools[2];
        assert_eq!(*category, Category::Collections);
        assert_eq!(collections, &vec!["123", "22546183", "vY-yVNran8c"]);
    }

    #[test]
    fn preset_names_match_value_enum() {
        for preset in Preset::value_variants() {
            let parsed = <Preset as ValueEnum>::from_str(preset.name(), false).unwrap();
            assert_eq!(parsed, *preset);
        }
        assert_eq!(Preset::value_variants().len(), 7);
    }
}
