//! HTML directory listings for sites that opt in.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as FmtWrite;
use std::io;
use std::path::Path;

#[derive(Debug)]
struct ListingItem {
    name: String,
    is_dir: bool,
}

/// Render `dir` as an HTML index. `uri` is the request path the directory was
/// reached through; links are built relative to it.
pub async fn render(dir: &Path, uri: &str) -> io::Result<String> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut items = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        // Non UTF-8 names cannot be linked reliably.
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        items.push(ListingItem { name, is_dir });
    }

    items.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    let base = if uri.ends_with('/') {
        uri.to_string()
    } else {
        format!("{}/", uri)
    };

    let mut body = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Index of ",
    );
    body.push_str(&encode_text(&base));
    body.push_str(
        "</title><style>body{font-family:system-ui;margin:2rem;}ul{list-style:none;padding:0;}li{padding:0.25rem 0;}</style></head><body>",
    );
    body.push_str("<h1>Index of ");
    body.push_str(&encode_text(&base));
    body.push_str("</h1><ul>");

    if base != "/" {
        body.push_str("<li><a href=\"../\">../</a></li>");
    }

    for item in items {
        let suffix = if item.is_dir { "/" } else { "" };
        let href = format!("{}{}{}", base, urlencoding::encode(&item.name), suffix);
        let _ = write!(
            body,
            "<li><a href=\"{}\">{}{}</a></li>",
            encode_double_quoted_attribute(&href),
            encode_text(&item.name),
            suffix
        );
    }

    body.push_str("</ul></body></html>");
    Ok(body)
}
