use std::path::{Path, PathBuf};
use url::Url;

/// Characters that are invalid in file names on at least one common platform
const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const INDEX_FILE: &str = "index.html";
const DEFAULT_EXTENSION: &str = ".html";

/// Replace characters that cannot appear in a file name with underscores
pub fn sanitize_filename(name: &str) -> String {
    name.replace(INVALID_FILENAME_CHARS, "_")
}

/// Local save path for a URL below the crawl directory
pub fn save_path(url: &Url, crawl_dir: &Path) -> PathBuf {
    crawl_dir.join(relative_save_path(url))
}

/// Relative save path for a URL: `<host>/<path-derived-file>`
///
/// Query strings are folded into the file name so `x?g=1` and `x?g=2`
/// land in different files:
///
/// * `https://a.com/` -> `a.com/index.html`
/// * `https://a.com/guide` -> `a.com/guide.html`
/// * `https://a.com/x.htm?g=1` -> `a.com/x_g=1.htm`
pub fn relative_save_path(url: &Url) -> PathBuf {
    let mut path = url.path().trim_start_matches('/').to_string();
    if path.is_empty() || path.ends_with('/') {
        path.push_str(INDEX_FILE);
    }

    let file = match url.query().filter(|query| !query.is_empty()) {
        Some(query) => {
            let (root, ext) = split_extension(&path);
            let ext = if ext.is_empty() { DEFAULT_EXTENSION } else { ext };
            format!("{}_{}{}", root, sanitize_filename(query), ext)
        }
        None => {
            if split_extension(&path).1.is_empty() {
                path.push_str(DEFAULT_EXTENSION);
            }
            path
        }
    };

    PathBuf::from(host_dir(url)).join(file)
}

fn host_dir(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    }
}

/// Split `path` into (root, extension) looking only at the last segment.
///
/// Leading dots of the file name do not start an extension, so
/// `.hidden` has none while `a.b` has `.b`.
fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let name = &path[name_start..];
    let leading_dots = name.len() - name.trim_start_matches('.').len();

    match name.rfind('.') {
        Some(dot) if dot > leading_dots => path.split_at(name_start + dot),
        _ => (path, ""),
    }
}
