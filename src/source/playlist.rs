//! Stream list parsing
//!
//! Plain text, one URL per line. `#` starts a comment, blank lines are
//! skipped, bare hosts get an `https://` scheme, and the result comes
//! back de-duplicated and sorted.

use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("failed to read stream list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Load stream URLs from a newline-delimited file.
pub fn load_stream_list(path: &Path) -> Result<Vec<String>, PlaylistError> {
    let text = fs::read_to_string(path).map_err(|source| PlaylistError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let links = parse_stream_list(&text);
    log::info!("Loaded {} stream(s) from {}", links.len(), path.display());
    Ok(links)
}

/// Parse the contents of a stream list file.
pub fn parse_stream_list(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let url = if line.contains("://") {
            line.to_string()
        } else {
            format!("https://{}", line)
        };
        if !looks_like_stream_url(&url) {
            log::warn!("Skipping invalid stream entry: {}", line);
            continue;
        }
        links.push(url);
    }
    links.sort();
    links.dedup();
    links
}

/// Cheap shape check: a scheme separator plus a dot somewhere after it.
fn looks_like_stream_url(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, rest)) => !scheme.is_empty() && rest.contains('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_urls_and_skips_comments() {
        let text = "\
# favorites
https://cdn.example.com/a.m3u8

  https://cdn.example.com/b.m3u8
# trailing comment
";
        let links = parse_stream_list(text);
        assert_eq!(
            links,
            vec![
                "https://cdn.example.com/a.m3u8".to_string(),
                "https://cdn.example.com/b.m3u8".to_string(),
            ]
        );
    }

    #[test]
    fn bare_hosts_get_https_scheme() {
        let links = parse_stream_list("cdn.example.com/live.m3u8\n");
        assert_eq!(links, vec!["https://cdn.example.com/live.m3u8".to_string()]);
    }

    #[test]
    fn duplicates_collapse_and_output_is_sorted() {
        let text = "\
https://z.example.com/1.m3u8
https://a.example.com/1.m3u8
https://z.example.com/1.m3u8
";
        let links = parse_stream_list(text);
        assert_eq!(
            links,
            vec![
                "https://a.example.com/1.m3u8".to_string(),
                "https://z.example.com/1.m3u8".to_string(),
            ]
        );
    }

    #[test]
    fn rejects_entries_without_host_shape() {
        let links = parse_stream_list("not-a-url\nftp://\nhttp://localhost/stream\n");
        assert!(links.is_empty());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_stream_list(Path::new("/definitely/not/here.m3u8"));
        assert!(matches!(err, Err(PlaylistError::Read { .. })));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "https://cdn.example.com/x.m3u8").expect("write");
        let links = load_stream_list(file.path()).expect("load");
        assert_eq!(links.len(), 1);
    }
}
