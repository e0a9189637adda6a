use crate::ui::html::escape;

/// Static page metadata rendered into `<head>`.
#[derive(Debug, Clone, Copy)]
pub struct PageMeta {
    pub title: &'static str,
    pub description: &'static str,
}

pub const SITE_META: PageMeta = PageMeta {
    title: "CV Grade | Instant CV feedback",
    description: "Upload your CV and get a recruiter-style grade in seconds, then unlock a full rewrite.",
};

/// Wraps `body` (already-rendered HTML) in a full document with a full-height container.
pub fn render_layout(meta: &PageMeta, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
</head>
<body>
<main class="min-h-screen">
{body}
</main>
</body>
</html>
"#,
        title = escape(meta.title),
        description = escape(meta.description),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_wraps_body_and_sets_meta() {
        let meta = PageMeta {
            title: "Grades & Rewrites",
            description: "desc",
        };
        let page = render_layout(&meta, "<p>hello</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Grades &amp; Rewrites</title>"));
        assert!(page.contains(r#"<meta name="description" content="desc">"#));
        assert!(page.contains("<main class=\"min-h-screen\">\n<p>hello</p>\n</main>"));
    }
}
