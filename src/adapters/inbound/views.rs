//! HTML views for the site pages.
//!
//! Every dynamic value goes through `escape` before it is written out.

use crate::domain::entities::{ErrorView, HomeView};

/// Navigation state shared by all pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Layout {
    /// Show the About link (Beta flag enabled)
    pub show_about: bool,
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(layout: Layout, title: &str, body: &str) -> String {
    let about = if layout.show_about {
        r#"<li><a href="/Home/About">About</a></li>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<title>{title} - SquadraExperience</title>
</head>
<body>
<header>
<nav>
<a href="/">SquadraExperience</a>
<ul>
<li><a href="/">Home</a></li>
<li><a href="/Home/Privacy">Privacy</a></li>
{about}
</ul>
</nav>
</header>
<main role="main">
{body}
</main>
<footer>&copy; SquadraExperience - <a href="/Home/Privacy">Privacy</a></footer>
</body>
</html>
"#,
        title = escape(title),
        about = about,
        body = body,
    )
}

pub fn home(layout: Layout, view: &HomeView) -> String {
    let environment = match &view.environment_name {
        Some(env) => format!(
            "<p class=\"environment\">Environment: <strong>{}</strong></p>\n",
            escape(env)
        ),
        None => String::new(),
    };

    let body = format!(
        r#"<div class="text-center">
<h1>Random {breed}</h1>
<img class="dog" src="{url}" alt="{breed}" />
{environment}</div>"#,
        breed = escape(&view.breed_name),
        url = escape(&view.image_url),
        environment = environment,
    );

    page(layout, "Home Page", &body)
}

pub fn privacy(layout: Layout) -> String {
    page(
        layout,
        "Privacy Policy",
        "<h1>Privacy Policy</h1>\n<p>Use this page to detail your site's privacy policy.</p>",
    )
}

pub fn about(layout: Layout) -> String {
    page(
        layout,
        "About",
        "<h1>About</h1>\n<p>This page is only visible while the Beta feature is enabled.</p>",
    )
}

pub fn error(layout: Layout, view: &ErrorView) -> String {
    let mut body = String::from(
        "<h1 class=\"text-danger\">Error.</h1>\n<h2 class=\"text-danger\">An error occurred while processing your request.</h2>\n",
    );

    if view.show_request_id() {
        let id = view.request_id.as_deref().unwrap_or_default();
        body.push_str(&format!(
            "<p><strong>Request ID:</strong> <code>{}</code></p>\n",
            escape(id)
        ));
    }

    if view.development {
        body.push_str(
            "<h3>Development Mode</h3>\n<p>Swapping to the <strong>Development</strong> environment displays more detailed information in the logs.</p>\n",
        );
    }

    page(layout, "Error", &body)
}

pub fn not_found(layout: Layout) -> String {
    page(
        layout,
        "Not Found",
        "<h1>Not Found</h1>\n<p>The page you requested does not exist.</p>",
    )
}
