use axum::response::Html;

use crate::payment_client::display_price;
use crate::ui::{
    render_layout, AvatarStack, BrowserNotifier, ScrollReveal, REVEAL_SCRIPT, SITE_META,
};

/// Avatars shown under the hero as social proof.
const HAPPY_CUSTOMERS: &[&str] = &[
    "/static/avatars/1.jpg",
    "/static/avatars/2.jpg",
    "/static/avatars/3.jpg",
    "/static/avatars/4.jpg",
];
const OTHER_CUSTOMERS: u32 = 1200;

/// GET /
pub async fn landing_handler() -> Html<String> {
    Html(render_landing())
}

pub fn render_landing() -> String {
    let avatars = AvatarStack::new(
        HAPPY_CUSTOMERS.iter().map(|s| s.to_string()).collect(),
        Some(OTHER_CUSTOMERS),
    );

    let hero = format!(
        r#"<section class="hero">
<h1>Find out how recruiters see your CV</h1>
<p>Upload a PDF and get a graded breakdown in under a minute. Free.</p>
<form action="/api/v1/grade/upload" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept="application/pdf" required>
<input type="email" name="email" placeholder="Email me the report (optional)">
<button type="submit">Grade my CV</button>
</form>
{avatars}
</section>"#,
        avatars = avatars.render(),
    );

    let rewrite = ScrollReveal::mount(BrowserNotifier::default()).render(&format!(
        "<section class=\"rewrite\"><h2>Want it fixed?</h2>\
         <p>A full rewrite with stronger bullets and measurable outcomes for {}.</p></section>",
        display_price()
    ));

    render_layout(&SITE_META, &format!("{hero}\n{rewrite}\n{REVEAL_SCRIPT}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_composes_widgets() {
        let page = render_landing();
        assert!(page.contains("<title>CV Grade | Instant CV feedback</title>"));
        assert_eq!(page.matches(r#"<img class="avatar""#).count(), 4);
        assert!(page.contains("+1200"));
        assert!(page.contains(r#"<div class="reveal""#));
        assert!(page.contains("$30.00"));
        assert!(page.contains("IntersectionObserver"));
    }
}
