//! Templated HTML pages.
//!
//! Renders `.html` files and directory indexes from the site directory as
//! templates, serves the "what is my IP" page, and injects the live reload
//! script in development mode.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::extract::{ConnectInfo, Query};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use devsite_config::RunMode;
use minijinja::{Value, context};
use percent_encoding::percent_decode_str;
use serde::Deserialize;

use super::client_ip::client_ip;
use crate::error::ServerError;
use crate::live_reload::inject_reload_script;
use crate::state::AppState;
use crate::templates;

/// URL prefix of the IP page.
const IP_PAGE_PREFIX: &str = "/ip/";

/// IP addresses longer than this get the smaller text size.
const LONG_IP_LEN: usize = 18;

/// User agents that get a plain-text IP instead of the HTML page.
const PLAIN_TEXT_AGENTS: [&str; 3] = ["curl", "Wget", "HTTPie"];

/// Render the page for a request.
pub(crate) async fn render(state: &AppState, req: &Parts) -> Result<Response, ServerError> {
    let url_path = req.uri.path();
    let file_path = resolve_file(&state.site_dir, url_path)
        .ok_or_else(|| ServerError::NotFound(url_path.to_owned()))?;

    let source = match tokio::fs::read_to_string(&file_path).await {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::NotFound(url_path.to_owned()));
        }
        Err(e) => return Err(e.into()),
    };

    let headers = &req.headers;
    let root_slash = Value::from_safe_string(root_slash(state.mode, headers).to_owned());

    let context = if url_path.starts_with(IP_PAGE_PREFIX) {
        let peer = req
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let ip = client_ip(headers, peer, debug_requested(&req.uri));

        if wants_plain_text(headers) {
            return Ok((
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("{}\n", ip.ip),
            )
                .into_response());
        }

        context! {
            root_slash,
            text_size_ip_address => text_size_class(&ip.ip),
            client_ip => ip.ip,
            forwarded_ips => ip.forwarded,
        }
    } else {
        context! { root_slash }
    };

    let mut html = templates::render(&state.templates, &source, context)?;

    if state.mode.is_development() {
        tracing::debug!(path = %file_path.display(), "Live reload script injected");
        html = inject_reload_script(&html);
    }

    Ok(Html(html).into_response())
}

/// Map a URL path to a file under `site_dir`.
///
/// Directory paths (trailing `/`) map to their `index.html`. Returns `None`
/// for paths that are not valid UTF-8 once decoded or that try to leave the
/// site directory.
fn resolve_file(site_dir: &Path, url_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(url_path).decode_utf8().ok()?;
    let mut file = site_dir.to_path_buf();

    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => file.push(s),
        }
    }

    if decoded.ends_with('/') {
        file.push("index.html");
    }

    Some(file)
}

/// Prefix for root-relative links in templates.
///
/// Development builds link relative to the page; production links from the
/// root. Requests proxied through `*.orb.local` always link from the root.
fn root_slash(mode: RunMode, headers: &HeaderMap) -> &'static str {
    let behind_orb = headers
        .get("x-forwarded-host")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|host| host.ends_with("orb.local"));

    if mode.is_development() && !behind_orb {
        ""
    } else {
        "/"
    }
}

/// Whether the client asked for a plain-text answer.
fn wants_plain_text(headers: &HeaderMap) -> bool {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    };

    header_value(header::ACCEPT).contains("text/plain")
        || PLAIN_TEXT_AGENTS
            .iter()
            .any(|agent| header_value(header::USER_AGENT).contains(agent))
}

/// Tailwind text size class for displaying `ip`.
fn text_size_class(ip: &str) -> &'static str {
    if ip.len() > LONG_IP_LEN {
        "text-2xl"
    } else {
        "text-4xl"
    }
}

/// Query parameters understood by the IP page.
#[derive(Debug, Deserialize)]
struct IpPageQuery {
    debug: Option<String>,
}

/// Whether the query string contains `debug=true` (value case-insensitive).
fn debug_requested(uri: &Uri) -> bool {
    Query::<IpPageQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.debug)
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}
