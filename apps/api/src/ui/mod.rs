// Server-rendered page pieces: layout shell, scroll-reveal wrapper, avatar stack.
// Everything here returns HTML strings; routes/pages.rs assembles the landing page.

pub mod avatars;
pub mod html;
pub mod layout;
pub mod reveal;

pub use avatars::AvatarStack;
pub use layout::{render_layout, SITE_META};
pub use reveal::{BrowserNotifier, ScrollReveal, REVEAL_SCRIPT};
