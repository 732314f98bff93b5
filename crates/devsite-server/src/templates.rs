//! Page templating.
//!
//! HTML pages in the site directory are `minijinja` templates rendered on
//! every request, so edits show up on the next reload without a restart.

use minijinja::{AutoEscape, Environment, Value};

/// Create the template environment.
///
/// Output is always HTML-escaped, whatever the page's file name.
pub(crate) fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env
}

/// Render template `source` with `context`.
pub(crate) fn render(
    env: &Environment<'_>,
    source: &str,
    context: Value,
) -> Result<String, minijinja::Error> {
    env.render_str(source, context)
}
