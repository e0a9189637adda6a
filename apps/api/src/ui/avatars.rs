use crate::ui::html::escape;

pub const AVATAR_SIZE_PX: u32 = 40;
/// Negative left margin applied to every avatar after the first.
pub const AVATAR_OVERLAP_PX: u32 = 16;

/// A row of overlapping circular avatars with an optional "+N" overflow badge.
#[derive(Debug, Clone, Default)]
pub struct AvatarStack {
    pub avatar_urls: Vec<String>,
    pub num_people: Option<u32>,
}

impl AvatarStack {
    pub fn new(avatar_urls: Vec<String>, num_people: Option<u32>) -> Self {
        Self {
            avatar_urls,
            num_people,
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::from(r#"<div class="avatar-stack" style="display:flex">"#);

        for (i, url) in self.avatar_urls.iter().enumerate() {
            let overlap = if i == 0 {
                String::new()
            } else {
                format!("margin-left:-{AVATAR_OVERLAP_PX}px;")
            };
            html.push_str(&format!(
                r#"<img class="avatar" src="{src}" alt="Avatar {n}" width="{AVATAR_SIZE_PX}" height="{AVATAR_SIZE_PX}" style="{overlap}border-radius:50%;border:2px solid #fff">"#,
                src = escape(url),
                n = i + 1,
            ));
        }

        if let Some(n) = self.num_people.filter(|&n| n != 0) {
            html.push_str(&format!(
                r#"<span class="avatar-badge" style="margin-left:-{AVATAR_OVERLAP_PX}px;width:{AVATAR_SIZE_PX}px;height:{AVATAR_SIZE_PX}px;border-radius:50%">+{n}</span>"#
            ));
        }

        html.push_str("</div>");
        html
    }
}
