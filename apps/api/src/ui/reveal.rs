//! Scroll-reveal widget.
//!
//! Content starts hidden and is revealed the first time it scrolls into view. The
//! viewport mechanism is abstracted as a `VisibilityNotifier`; in the browser that is
//! an IntersectionObserver driven by `REVEAL_SCRIPT`, in tests it is a fake.

/// Detection settings for the watch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the element that must be visible.
    pub threshold: f32,
    /// Pixels the detection region is shrunk by at the bottom of the viewport.
    pub bottom_margin_px: u32,
}

pub const REVEAL_OPTIONS: ObserverOptions = ObserverOptions {
    threshold: 0.1,
    bottom_margin_px: 40,
};

impl ObserverOptions {
    /// CSS-style root margin, e.g. `0px 0px -40px 0px`.
    pub fn root_margin(&self) -> String {
        format!("0px 0px -{}px 0px", self.bottom_margin_px)
    }
}

/// Opaque registration returned by a notifier.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Something that can tell a widget when it enters the viewport.
///
/// The host delivers intersection changes by calling `ScrollReveal::on_intersection`.
pub trait VisibilityNotifier {
    fn observe(&mut self, options: ObserverOptions) -> WatchId;
    fn unobserve(&mut self, id: WatchId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed,
}

pub const VISIBLE_CLASS: &str = "is-visible";

pub struct ScrollReveal<N: VisibilityNotifier> {
    notifier: N,
    watch: Option<WatchId>,
    state: RevealState,
}

impl<N: VisibilityNotifier> ScrollReveal<N> {
    /// Starts hidden and registers a watch with `notifier`.
    pub fn mount(mut notifier: N) -> Self {
        let watch = notifier.observe(REVEAL_OPTIONS);
        Self {
            notifier,
            watch: Some(watch),
            state: RevealState::Hidden,
        }
    }

    /// Handles one intersection change. Returns true only on the transition to revealed.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn on_intersection(&mut self, is_intersecting: bool) -> bool {
        if !is_intersecting || self.state == RevealState::Revealed {
            return false;
        }
        self.state = RevealState::Revealed;
        if let Some(id) = self.watch.take() {
            self.notifier.unobserve(id);
        }
        true
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn state(&self) -> RevealState {
        self.state
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_observing(&self) -> bool {
        self.watch.is_some()
    }

    pub fn render(&self, inner: &str) -> String {
        reveal_markup(inner, self.state == RevealState::Revealed)
    }
}

/// Notifier for server-rendered pages. Registration is handed off to `REVEAL_SCRIPT`,
/// which observes the element in the browser; nothing is watched server-side.
#[derive(Debug, Default)]
pub struct BrowserNotifier {
    issued: u64,
}

impl VisibilityNotifier for BrowserNotifier {
    fn observe(&mut self, _options: ObserverOptions) -> WatchId {
        self.issued += 1;
        WatchId(self.issued)
    }

    fn unobserve(&mut self, _id: WatchId) {}
}

impl<N: VisibilityNotifier> Drop for ScrollReveal<N> {
    fn drop(&mut self) {
        if let Some(id) = self.watch.take() {
            self.notifier.unobserve(id);
        }
    }
}

/// Wrapper markup; the client script reads the observer options from data attributes.
pub fn reveal_markup(inner: &str, revealed: bool) -> String {
    let class = if revealed {
        format!("reveal {VISIBLE_CLASS}")
    } else {
        "reveal".to_string()
    };
    format!(
        r#"<div class="{class}" data-reveal-threshold="{}" data-reveal-margin="{}">{inner}</div>"#,
        REVEAL_OPTIONS.threshold,
        REVEAL_OPTIONS.root_margin(),
    )
}

/// Browser-side notifier: one IntersectionObserver per `.reveal` element, disconnected
/// after the first intersection.
pub const REVEAL_SCRIPT: &str = r#"<script>
document.querySelectorAll('.reveal:not(.is-visible)').forEach(function (el) {
  var observer = new IntersectionObserver(function (entries) {
    entries.forEach(function (entry) {
      if (entry.isIntersecting) {
        entry.target.classList.add('is-visible');
        observer.unobserve(entry.target);
      }
    });
  }, {
    threshold: parseFloat(el.dataset.revealThreshold),
    rootMargin: el.dataset.revealMargin
  });
  observer.observe(el);
});
</script>"#;
