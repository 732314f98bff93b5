//! Live reload script injection.

/// Client script that reloads the page on any message from the reload socket.
const RELOAD_SCRIPT: &str = r#"<script>
(() => {
  const protocol = window.location.protocol === "https:" ? "wss" : "ws";
  const socket = new WebSocket(`${protocol}://${window.location.host}/ws`);
  socket.onmessage = () => window.location.reload();
})();
</script>
"#;

const BODY_CLOSE: &str = "</body>";

/// Insert the reload script before the first closing body tag.
///
/// Documents without a `</body>` tag are returned unchanged.
pub(crate) fn inject_reload_script(html: &str) -> String {
    // ASCII lowercasing keeps byte offsets intact.
    let Some(index) = html.to_ascii_lowercase().find(BODY_CLOSE) else {
        return html.to_owned();
    };

    let mut out = String::with_capacity(html.len() + RELOAD_SCRIPT.len());
    out.push_str(&html[..index]);
    out.push_str(RELOAD_SCRIPT);
    out.push_str(&html[index..]);
    out
}
