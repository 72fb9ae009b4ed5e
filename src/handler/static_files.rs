//! Static file serving module
//!
//! Resolves request paths under the static directory and loads files through
//! the open file cache, or straight from disk when the cache is disabled.

use crate::cache::{CacheError, FileHandleCache};
use crate::config::AppState;
use crate::handler::request::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// File content plus the modification time to advertise
pub struct LoadedFile {
    pub data: Vec<u8>,
    pub last_modified: SystemTime,
}

/// Serve a static file for the request path
pub async fn serve_static(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let Some(file_path) = resolve_path(&state.static_dir, ctx.path, &state.config.index_file)
    else {
        logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
        return serve_error(state, 403, ctx.is_head).await;
    };

    // Cache key is the canonical path, so a symlink and its target share one handle
    let Ok(file_path) = fs::canonicalize(&file_path).await else {
        return serve_error(state, 404, ctx.is_head).await;
    };

    match load_file(state, &file_path).await {
        Ok(file) => http::build_file_response(
            file.data,
            mime::content_type_for(&file_path),
            file.last_modified,
            &state.config.http.server_name,
            ctx.is_head,
        ),
        Err(status) => serve_error(state, status, ctx.is_head).await,
    }
}

/// Map a decoded request path to a file under `static_dir`
///
/// `/` maps to the index file. Returns `None` for any path containing `..`.
pub fn resolve_path(static_dir: &Path, request_path: &str, index_file: &str) -> Option<PathBuf> {
    let relative = if request_path == "/" {
        index_file
    } else {
        request_path.trim_start_matches('/')
    };

    if relative.contains("..") {
        return None;
    }

    Some(static_dir.join(relative))
}

/// Load a whole file, returning the HTTP status to answer with on failure
///
/// With the cache enabled: `NotFound` maps to 404, a failed open to 503 and
/// a failed read of an obtained handle to 500.
pub async fn load_file(state: &AppState, path: &Path) -> Result<LoadedFile, u16> {
    match &state.file_cache {
        Some(cache) => load_cached(cache, path),
        None => load_uncached(path).await,
    }
}

// No await between get and read, so an eviction cannot close the handle in between
fn load_cached(cache: &FileHandleCache, path: &Path) -> Result<LoadedFile, u16> {
    let entry = cache.get(path).map_err(|e| match e {
        CacheError::NotFound { .. } => 404_u16,
        other => {
            logger::log_error(&format!("Open file cache: {other}"));
            503_u16
        }
    })?;

    let data = entry.read_all().map_err(|e| {
        logger::log_error(&format!(
            "Failed to read cached file '{}': {e}",
            path.display()
        ));
        500_u16
    })?;

    Ok(LoadedFile {
        data,
        last_modified: entry.last_modified(),
    })
}

async fn load_uncached(path: &Path) -> Result<LoadedFile, u16> {
    let meta = match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta,
        _ => return Err(404),
    };

    let read_failed = |e: io::Error| {
        logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
        500_u16
    };

    let data = fs::read(path).await.map_err(read_failed)?;
    let last_modified = meta.modified().map_err(read_failed)?;

    Ok(LoadedFile {
        data,
        last_modified,
    })
}

/// Serve an error response, preferring `<static_dir>/<status>.html`
pub async fn serve_error(state: &AppState, status: u16, is_head: bool) -> Response<Full<Bytes>> {
    let page_path = state.static_dir.join(format!("{status}.html"));
    let page = match fs::read(&page_path).await {
        Ok(html) => Some(html),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to load error page '{}': {e}",
                page_path.display()
            ));
            None
        }
    };

    http::build_error_response(status, page, &state.config.http.server_name, is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs as std_fs;

    fn test_state(static_dir: &Path, cache_enabled: bool, max_size: usize) -> AppState {
        let mut config = Config::load_from("/nonexistent/server.conf").unwrap();
        config.static_dir = static_dir.to_string_lossy().into_owned();
        config.open_file_cache.enabled = cache_enabled;
        config.open_file_cache.max_size = max_size;
        AppState::new(config).unwrap()
    }

    #[test]
    fn test_resolve_root_to_index() {
        let dir = Path::new("/srv/www");
        assert_eq!(
            resolve_path(dir, "/", "index.html"),
            Some(PathBuf::from("/srv/www/index.html"))
        );
        assert_eq!(
            resolve_path(dir, "/css/site.css", "index.html"),
            Some(PathBuf::from("/srv/www/css/site.css"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = Path::new("/srv/www");
        assert_eq!(resolve_path(dir, "/../etc/passwd", "index.html"), None);
        assert_eq!(resolve_path(dir, "/a/../../b", "index.html"), None);
    }

    #[test]
    fn test_resolve_strips_extra_slashes() {
        let dir = Path::new("/srv/www");
        assert_eq!(
            resolve_path(dir, "//etc/passwd", "index.html"),
            Some(PathBuf::from("/srv/www/etc/passwd"))
        );
    }

    #[tokio::test]
    async fn test_load_through_cache() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("test.txt"), "test content").unwrap();
        let state = test_state(dir.path(), true, 2);

        let file = load_file(&state, &dir.path().join("test.txt")).await.unwrap();
        assert_eq!(file.data, b"test content");
        let cache = state.file_cache.as_ref().unwrap();
        assert!(cache.contains(&dir.path().join("test.txt")));

        let missing = load_file(&state, &dir.path().join("nope.txt")).await;
        assert_eq!(missing.err(), Some(404));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_load_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("test.txt"), "test content").unwrap();
        let state = test_state(dir.path(), false, 2);
        assert!(state.file_cache.is_none());

        let file = load_file(&state, &dir.path().join("test.txt")).await.unwrap();
        assert_eq!(file.data, b"test content");
        assert_eq!(load_file(&state, dir.path()).await.err(), Some(404));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_failure_is_503() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked.txt");
        std_fs::write(&locked, "secret").unwrap();
        std_fs::set_permissions(&locked, std_fs::Permissions::from_mode(0o000)).unwrap();
        if std_fs::File::open(&locked).is_ok() {
            // running as root, permission bits are not enforced
            return;
        }

        let state = test_state(dir.path(), true, 2);
        assert_eq!(load_file(&state, &locked).await.err(), Some(503));
        assert!(state.file_cache.as_ref().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_shares_cached_handle() {
        use crate::handler::request::QueryParams;

        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("page.html"), "<p>page</p>").unwrap();
        std::os::unix::fs::symlink(dir.path().join("page.html"), dir.path().join("alias.html"))
            .unwrap();
        let state = test_state(dir.path(), true, 2);
        let params = QueryParams::parse(None);

        for path in ["/page.html", "/alias.html"] {
            let ctx = RequestContext {
                path,
                params: &params,
                is_head: false,
            };
            assert_eq!(serve_static(&ctx, &state).await.status(), 200);
        }

        let cache = state.file_cache.as_ref().unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&std_fs::canonicalize(dir.path().join("page.html")).unwrap()));
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_error_page_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), true, 2);

        let plain = serve_error(&state, 404, false).await;
        assert_eq!(plain.headers()["Content-Type"], "text/plain");

        std_fs::write(dir.path().join("404.html"), "<h1>missing</h1>").unwrap();
        let custom = serve_error(&state, 404, false).await;
        assert_eq!(custom.status(), 404);
        assert_eq!(custom.headers()["Content-Type"], "text/html");
    }
}
