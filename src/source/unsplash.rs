// unsplash.rs — Unsplash Source 客户端模块
// 负责两件事：根据选项挑选请求 URL，以及把图片下载到本地壁纸文件
//
// 注意：source.unsplash.com 的各个端点直接重定向到图片本身，
// 不需要 Access Key，也没有 JSON 响应。

use super::{Category, ImageFetcher, Options};
use crate::error::AppError;
use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom; // 提供 choose()，在切片中均匀随机取一个元素
use std::path::{Path, PathBuf};
use tokio::fs::{self, File}; // tokio 提供的异步文件操作
use tokio::io::AsyncWriteExt; // 异步写入 trait，提供 write_all() 等方法
use tracing::debug;

/// 默认的 Unsplash Source 基础 URL
pub const BASE_URL: &str = "https://source.unsplash.com";

/// 根据选项构建一次请求的 URL
///
/// 先在非空的类别中均匀随机选一个，再在该类别的候选池中均匀随机选一项。
/// 拼接顺序固定：类别路径 → weekly/daily → featured → 分辨率 →
/// （URL 仍等于 base 时）/random → 搜索查询串。
pub fn select_url<R: Rng + ?Sized>(options: &Options, base_url: &str, rng: &mut R) -> String {
    let pools = options.pools();

    // 空类别绝不能参与随机选择
    let candidates: Vec<&(Category, Vec<&str>)> =
        pools.iter().filter(|(_, pool)| !pool.is_empty()).collect();

    let chosen = match candidates.choose(rng) {
        Some((category, pool)) => pool.choose(rng).map(|value| (*category, *value)),
        None => None,
    };

    let mut url = match chosen {
        Some((Category::Likes, user)) => format!("{base_url}/user/{user}/likes"),
        Some((Category::Users, user)) => format!("{base_url}/user/{user}"),
        Some((Category::Collections, id)) => format!("{base_url}/collection/{id}"),
        Some((Category::Search, _)) | None => base_url.to_string(),
    };

    let modifiers = &options.modifiers;
    if modifiers.weekly {
        url.push_str("/weekly");
    } else if modifiers.daily {
        url.push_str("/daily");
    }
    if modifiers.featured {
        url.push_str("/featured");
    }
    if let Some(resolution) = modifiers.resolution.as_deref() {
        url.push('/');
        url.push_str(resolution);
    }

    // 只有在前面什么都没追加时才显式请求随机图片
    if url == base_url {
        url.push_str("/random");
    }

    if let Some((Category::Search, term)) = chosen {
        url.push('?');
        url.push_str(&urlencoding::encode(term));
    }

    url
}

/// Unsplash Source 异步客户端
///
/// 封装了带固定 User-Agent 的 reqwest::Client，请求的 URL 由 [`select_url`] 给出。
pub struct UnsplashClient {
    /// HTTP 客户端（内部有连接池，应复用）
    client: reqwest::Client,
}

impl UnsplashClient {
    /// 创建新的客户端
    ///
    /// # 参数
    /// - `user_agent`: 每个请求携带的客户端标识
    pub fn new(user_agent: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self { client })
    }

    /// 把响应体逐块写入临时文件
    async fn write_body(&self, url: &str, part: &Path) -> Result<(), AppError> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        let mut file = File::create(part).await?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        debug!(url, bytes = written, "download finished");
        Ok(())
    }
}

#[async_trait]
impl ImageFetcher for UnsplashClient {
    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<(), AppError> {
        // 先写入 .part 文件，完成后再重命名覆盖，避免出现写了一半的壁纸
        let part = part_path(dest);

        if let Err(err) = self.write_body(url, &part).await {
            let _ = fs::remove_file(&part).await;
            return Err(err);
        }

        fs::rename(&part, dest).await?;
        Ok(())
    }
}

/// 下载过程中使用的临时文件路径：`<dest>.part`
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Modifiers, Preset, Sources};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    const BASE: &str = "https://source.unsplash.com";

    fn url_for(options: &Options) -> String {
        select_url(options, BASE, &mut StdRng::seed_from_u64(7))
    }

    fn with_sources(sources: Sources) -> Options {
        Options {
            sources,
            ..Default::default()
        }
    }

    #[test]
    fn no_sources_requests_random_photo() {
        assert_eq!(url_for(&Options::default()), format!("{BASE}/random"));
    }

    #[test]
    fn single_entry_is_deterministic() {
        let likes = with_sources(Sources {
            likes: vec!["qevitta".to_string()],
            ..Default::default()
        });
        let users = with_sources(Sources {
            users: vec!["erondu".to_string()],
            ..Default::default()
        });
        let collections = with_sources(Sources {
            collections: vec!["26962183".to_string()],
            ..Default::default()
        });

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(
                select_url(&likes, BASE, &mut rng),
                format!("{BASE}/user/qevitta/likes")
            );
            assert_eq!(
                select_url(&users, BASE, &mut rng),
                format!("{BASE}/user/erondu")
            );
            assert_eq!(
                select_url(&collections, BASE, &mut rng),
                format!("{BASE}/collection/26962183")
            );
        }
    }

    #[test]
    fn weekly_wins_over_daily() {
        let options = Options {
            sources: Sources {
                users: vec!["erondu".to_string()],
                ..Default::default()
            },
            modifiers: Modifiers {
                daily: true,
                weekly: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let url = url_for(&options);
        assert_eq!(url, format!("{BASE}/user/erondu/weekly"));
        assert!(!url.contains("/daily"));
    }

    #[test]
    fn resolution_alone_suppresses_random_fallback() {
        let options = Options {
            modifiers: Modifiers {
                resolution: Some("1920x1080".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(url_for(&options), format!("{BASE}/1920x1080"));
    }

    #[test]
    fn modifier_order_is_fixed() {
        let options = Options {
            sources: Sources {
                collections: vec!["9943257".to_string()],
                ..Default::default()
            },
            modifiers: Modifiers {
                daily: true,
                featured: true,
                resolution: Some("not-a-size".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(
            url_for(&options),
            format!("{BASE}/collection/9943257/daily/featured/not-a-size")
        );
    }

    #[test]
    fn dark_preset_resolves_to_collection() {
        let options = Options {
            presets: vec![Preset::Dark],
            ..Default::default()
        };

        assert_eq!(url_for(&options), format!("{BASE}/collection/22546183"));
    }

    #[test]
    fn search_appends_exactly_one_encoded_term() {
        let options = with_sources(Sources {
            search: vec!["nature".to_string(), "night sky".to_string()],
            ..Default::default()
        });

        let mut seen = Vec::new();
        for seed in 0..50 {
            let url = select_url(&options, BASE, &mut StdRng::seed_from_u64(seed));
            let (path, query) = url.split_once('?').unwrap();
            assert_eq!(path, format!("{BASE}/random"));
            assert!(query == "nature" || query == "night%20sky", "{query}");
            if !seen.contains(&query.to_string()) {
                seen.push(query.to_string());
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn search_term_with_comma_is_encoded_whole() {
        let options = with_sources(Sources {
            search: vec!["paris, france".to_string()],
            ..Default::default()
        });

        assert_eq!(url_for(&options), format!("{BASE}/random?paris%2C%20france"));
    }

    #[test]
    fn search_with_modifier_keeps_query_last() {
        let options = Options {
            sources: Sources {
                search: vec!["city".to_string()],
                ..Default::default()
            },
            modifiers: Modifiers {
                featured: true,
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(url_for(&options), format!("{BASE}/featured?city"));
    }

    #[test]
    fn empty_categories_are_never_chosen() {
        let options = with_sources(Sources {
            likes: vec!["a".to_string()],
            search: vec!["b".to_string()],
            ..Default::default()
        });

        for seed in 0..50 {
            let url = select_url(&options, BASE, &mut StdRng::seed_from_u64(seed));
            assert!(
                url == format!("{BASE}/user/a/likes") || url == format!("{BASE}/random?b"),
                "{url}"
            );
        }
    }

    #[test]
    fn part_path_keeps_original_extension() {
        let part = part_path(Path::new("/tmp/wallpaper.jpg"));
        assert_eq!(part, PathBuf::from("/tmp/wallpaper.jpg.part"));
    }

    /// 启动一个只响应一次的本地 HTTP 服务，返回其地址
    async fn serve_once(body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetch_overwrites_wallpaper_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("wallpaper.jpg");
        std::fs::write(&dest, b"old image").unwrap();

        let base = serve_once(b"new image bytes").await;
        let client = UnsplashClient::new("splashpaper/test").unwrap();
        client
            .fetch_to(&format!("{base}/random"), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new image bytes");
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        // 绑定后立即释放端口，之后的连接会被拒绝
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("wallpaper.jpg");
        let client = UnsplashClient::new("splashpaper/test").unwrap();

        let err = client
            .fetch_to(&format!("http://{addr}/random"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Connection(_)), "{err:?}");
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }
}
