//! Static front-end serving.
//!
//! Files under the site root are served as-is with a content type derived
//! from the extension. Misses answer 404 with the site's own 404 page, or a
//! small built-in page when the site has none. Detail pages that the
//! front-end links to with ids in the path or query can be pinned to a
//! single HTML file through [`SiteRewrite`] rules.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

use crate::config::SiteConfig;

const INLINE_NOT_FOUND: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="UTF-8">
  <title>404 - ページが見つかりません</title>
</head>
<body>
  <h1>404</h1>
  <p>お探しのページは見つかりませんでした。 / The page you requested was not found.</p>
  <p><a href="/">TomoTrip トップへ戻る / Back to TomoTrip</a></p>
</body>
</html>
"#;

/// Serve `file` for `prefix`, `prefix.html` and anything below `prefix/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRewrite {
    pub prefix: String,
    pub file: String,
}

impl SiteRewrite {
    pub fn new(prefix: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            file: file.into(),
        }
    }

    /// Route paths that this rule answers
    pub fn route_paths(&self) -> [String; 3] {
        let prefix = self.prefix.trim_end_matches('/');
        [
            prefix.to_string(),
            format!("{}.html", prefix),
            format!("{}/*rest", prefix),
        ]
    }
}

/// Rewrites used by the center display: detail pages carry the guide or
/// sponsor id in the query string.
pub fn center_display_rewrites() -> Vec<SiteRewrite> {
    vec![
        SiteRewrite::new("/guide-details", "guide-details.html"),
        SiteRewrite::new("/sponsor-detail", "sponsor-detail.html"),
    ]
}

#[derive(Debug, Clone)]
pub struct StaticSite {
    root: PathBuf,
    not_found_page: PathBuf,
    rewrites: Vec<SiteRewrite>,
}

impl StaticSite {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            not_found_page: root.join("404.html"),
            root,
            rewrites: Vec::new(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(&config.root)
            .with_not_found_page(&config.not_found_page)
            .with_rewrites(config.rewrites.clone())
    }

    /// Page relative to the root served on a miss
    pub fn with_not_found_page(mut self, page: impl AsRef<Path>) -> Self {
        self.not_found_page = self.root.join(page);
        self
    }

    pub fn with_rewrites(mut self, rewrites: Vec<SiteRewrite>) -> Self {
        self.rewrites = rewrites;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rewrites(&self) -> &[SiteRewrite] {
        &self.rewrites
    }

    /// Router answering every path from the filesystem. Meant to be used as
    /// the fallback of the API router.
    pub fn router(&self) -> Router {
        let page = self.not_found_page.clone();
        let not_found = tower::service_fn(move |_req: Request<Body>| {
            let page = page.clone();
            async move { Ok::<_, Infallible>(not_found_response(&page).await) }
        });

        let files = ServeDir::new(&self.root)
            .append_index_html_on_directories(true)
            .not_found_service(not_found);

        let mut router = Router::new();
        for rewrite in &self.rewrites {
            let target: Uri = match format!("/{}", rewrite.file.trim_start_matches('/')).parse() {
                Ok(uri) => uri,
                Err(e) => {
                    log::warn!("ignoring rewrite {} -> {}: {}", rewrite.prefix, rewrite.file, e);
                    continue;
                }
            };
            // re-enter the file service so a missing target gets the 404 page
            let files = files.clone();
            let forward = tower::service_fn(move |mut req: Request<Body>| {
                *req.uri_mut() = target.clone();
                let files = files.clone();
                async move { files.oneshot(req).await.map(IntoResponse::into_response) }
            });
            for path in rewrite.route_paths() {
                router = router.route_service(&path, forward.clone());
            }
        }

        router
            .fallback_service(files)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache"),
            ))
    }
}

async fn not_found_response(page: &Path) -> Response {
    match tokio::fs::read_to_string(page).await {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to read {}: {}", page.display(), e);
            }
            (StatusCode::NOT_FOUND, Html(INLINE_NOT_FOUND)).into_response()
        }
    }
}
