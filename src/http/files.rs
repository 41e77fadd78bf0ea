//! Static file serving for every method other than POST.
//!
//! GET and HEAD serve files below the root directory through tower-http's
//! `ServeFile`, after the URL path has been mapped onto the root. Directories get the classic treatment: redirect to
//! the slash form, serve `index.html`/`index.htm` when present, otherwise an
//! HTML listing. Other methods answer `501 Not Implemented`.

use std::path::{Path, PathBuf};

use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::http::handler::advance;
use crate::http::server::AppState;
use crate::net::{Connection, ConnectionState};

/// Characters left unescaped in listing links.
const HREF: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Fallback handler registered next to the POST handler.
pub async fn serve_static(State(state): State<AppState>, request: Request) -> Response {
    let connection = request.extensions().get::<Connection>().cloned();
    advance(connection.as_ref(), ConnectionState::ReadHeaders);

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = if method == Method::GET || method == Method::HEAD {
        state.files.serve(request).await
    } else {
        (StatusCode::NOT_IMPLEMENTED, format!("Unsupported method ({method})")).into_response()
    };

    advance(connection.as_ref(), ConnectionState::WriteResponse);
    tracing::debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Static request served"
    );
    response
}

/// A directory exposed over GET/HEAD.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Serve one GET or HEAD request.
    pub async fn serve(&self, request: Request) -> Response {
        let url_path = request.uri().path().to_string();
        let fs_path = self.resolve(&url_path);

        let is_dir = tokio::fs::metadata(&fs_path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return into_response(ServeFile::new(fs_path).oneshot(request).await);
        }

        if !url_path.ends_with('/') {
            let mut location = format!("{url_path}/");
            if let Some(query) = request.uri().query() {
                location.push('?');
                location.push_str(query);
            }
            return (
                StatusCode::MOVED_PERMANENTLY,
                [(header::LOCATION, location)],
            )
                .into_response();
        }

        for index in INDEX_FILES {
            let candidate = fs_path.join(index);
            if tokio::fs::metadata(&candidate)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
            {
                return into_response(ServeFile::new(candidate).oneshot(request).await);
            }
        }

        // hyper drops the body of HEAD responses
        match render_listing(&fs_path, &url_path).await {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::debug!(path = %fs_path.display(), error = %e, "Cannot list directory");
                (StatusCode::NOT_FOUND, "No permission to list directory").into_response()
            }
        }
    }

    /// Map a URL path onto the root, ignoring `.` and `..` segments.
    pub fn resolve(&self, url_path: &str) -> PathBuf {
        let decoded = percent_decode_str(url_path).decode_utf8_lossy();
        let mut path = self.root.clone();
        for segment in decoded.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                continue;
            }
            path.push(segment);
        }
        path
    }
}

fn into_response<B>(result: Result<axum::http::Response<B>, std::convert::Infallible>) -> Response
where
    axum::http::Response<B>: IntoResponse,
{
    match result {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

struct Entry {
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

async fn render_listing(dir: &Path, url_path: &str) -> std::io::Result<String> {
    let mut entries = Vec::new();
    let mut reader = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = reader.next_entry().await? {
        let is_symlink = entry.file_type().await.map(|t| t.is_symlink()).unwrap_or(false);
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }
    entries.sort_by_key(|e| e.name.to_lowercase());

    let display_path = escape_html(&percent_decode_str(url_path).decode_utf8_lossy());
    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Directory listing for {display_path}</title>\n</head>\n<body>\n\
         <h1>Directory listing for {display_path}</h1>\n<hr>\n<ul>\n"
    ));

    for entry in &entries {
        let mut link = entry.name.clone();
        let mut display = entry.name.clone();
        if entry.is_dir {
            link.push('/');
            display.push('/');
        }
        if entry.is_symlink {
            display = format!("{}@", entry.name);
        }
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            utf8_percent_encode(&link, HREF),
            escape_html(&display)
        ));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("post-logger-files-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn get(path: &str) -> Request {
        axum::http::Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn resolve_stays_inside_root() {
        let files = StaticFiles::new("/srv");
        assert_eq!(files.resolve("/a/b.txt"), PathBuf::from("/srv/a/b.txt"));
        assert_eq!(files.resolve("/../../etc/passwd"), PathBuf::from("/srv/etc/passwd"));
        assert_eq!(files.resolve("/./x//y/"), PathBuf::from("/srv/x/y"));
        assert_eq!(files.resolve("/with%20space"), PathBuf::from("/srv/with space"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a href='x'>&</a>"), "&lt;a href=&#x27;x&#x27;&gt;&amp;&lt;/a&gt;");
    }

    #[tokio::test]
    async fn serves_existing_file() {
        let root = scratch_dir();
        std::fs::write(root.join("hello.txt"), "hi there").unwrap();

        let response = StaticFiles::new(&root).serve(get("/hello.txt")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "hi there");

        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn dot_segments_are_ignored_for_files() {
        let root = scratch_dir();
        std::fs::write(root.join("hello.txt"), "hi there").unwrap();
        let files = StaticFiles::new(&root);

        for path in ["/../hello.txt", "/./hello.txt", "/../../hello.txt"] {
            let response = files.serve(get(path)).await;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
            assert_eq!(body_text(response).await, "hi there", "{path}");
        }

        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let root = scratch_dir();
        let response = StaticFiles::new(&root).serve(get("/nope.txt")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn directory_without_slash_redirects() {
        let root = scratch_dir();
        std::fs::create_dir(root.join("docs")).unwrap();

        let response = StaticFiles::new(&root).serve(get("/docs?x=1")).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/docs/?x=1");

        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn directory_index_is_served() {
        let root = scratch_dir();
        std::fs::create_dir(root.join("site")).unwrap();
        std::fs::write(root.join("site").join("index.htm"), "<p>index</p>").unwrap();

        let response = StaticFiles::new(&root).serve(get("/site/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<p>index</p>");

        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn directory_listing_is_sorted() {
        let root = scratch_dir();
        std::fs::write(root.join("b file.txt"), "").unwrap();
        std::fs::write(root.join("A.txt"), "").unwrap();
        std::fs::create_dir(root.join("sub")).unwrap();

        let response = StaticFiles::new(&root).serve(get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;

        assert!(html.contains("<title>Directory listing for /</title>"));
        let a = html.find("<a href=\"A.txt\">A.txt</a>").unwrap();
        let b = html.find("<a href=\"b%20file.txt\">b file.txt</a>").unwrap();
        let sub = html.find("<a href=\"sub/\">sub/</a>").unwrap();
        assert!(a < b && b < sub);

        std::fs::remove_dir_all(root).unwrap();
    }
}
