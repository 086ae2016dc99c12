//! A page: widget discovery plus the arena every host event is routed into.

use crate::manifest::prefetch::Prefetcher;
use crate::manifest::{resolve_url, SourceMeta};
use crate::platform::{DecoderEvent, IntersectionEntry, PlatformApi, SessionId};
use crate::widget::config::{ATTR_SRC, BACKGROUND_MARKER, PLAYER_MARKER};
use crate::widget::{
    Control, MediaEvent, Services, Slots, Widget, WidgetConfig, WidgetElement, WidgetId,
    WidgetVariant, WidgetView,
};
use crate::{Error, PageConfig, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Other(format!("bad selector {}: {:?}", css, e)))
}

fn count(root: &ElementRef<'_>, sel: &Selector) -> usize {
    root.select(sel).count()
}

/// Find every widget element in an HTML document, in document order.
///
/// Elements without a `data-player-src` are still returned; they are skipped
/// at mount time.
pub fn discover_elements(html: &str) -> Result<Vec<WidgetElement>> {
    let document = Html::parse_document(html);
    let roots = selector(&format!("[{}], [{}]", PLAYER_MARKER, BACKGROUND_MARKER))?;
    let timeline = selector("[data-player-timeline]")?;
    let progress = selector("[data-player-progress]")?;
    let buffered = selector("[data-player-buffered]")?;
    let handle = selector("[data-player-timeline-handle]")?;
    let time_duration = selector("[data-player-time-duration]")?;
    let time_progress = selector("[data-player-time-progress]")?;
    let before = selector("[data-player-before]")?;
    let video = selector("video")?;

    let mut out = Vec::new();
    for el in document.select(&roots) {
        let variant = if el.value().attr(PLAYER_MARKER).is_some() {
            WidgetVariant::Player
        } else {
            WidgetVariant::Background
        };
        let attributes = el.value().attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let slots = Slots {
            timeline: count(&el, &timeline) > 0,
            progress: count(&el, &progress) > 0,
            buffered: count(&el, &buffered) > 0,
            handle: count(&el, &handle) > 0,
            time_duration: count(&el, &time_duration),
            time_progress: count(&el, &time_progress),
            before: count(&el, &before) > 0,
        };
        out.push(WidgetElement { variant, attributes, slots, has_video: count(&el, &video) > 0 });
    }
    Ok(out)
}

/// Owns the widgets of one document and routes host events to them.
pub struct Page {
    config: PageConfig,
    platform: Arc<dyn PlatformApi>,
    services: Services,
    widgets: BTreeMap<WidgetId, Widget>,
    next_id: u32,
    prefetcher: Prefetcher,
    url: Option<String>,
}

impl Page {
    pub fn new(config: PageConfig, platform: Arc<dyn PlatformApi>) -> Self {
        let services = Services::from_platform(platform.as_ref(), &config);
        let prefetcher = Prefetcher::new(platform.fetcher());
        Self {
            config,
            platform,
            services,
            widgets: BTreeMap::new(),
            next_id: 1,
            prefetcher,
            url: None,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// URL of the last loaded document
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Fetch a document with the platform fetcher and mount its widgets
    pub fn load_url(&mut self, url: &str) -> Result<Vec<WidgetId>> {
        let html = self
            .platform
            .fetcher()
            .fetch_text(url)
            .map_err(|e| Error::LoadError(format!("{}: {}", url, e)))?;
        let ids = self.mount_document(&html, Some(url))?;
        self.url = Some(url.to_string());
        Ok(ids)
    }

    /// Mount every widget of `html`. Relative sources resolve against `base`.
    pub fn mount_document(&mut self, html: &str, base: Option<&str>) -> Result<Vec<WidgetId>> {
        let elements = discover_elements(html)?;
        log::debug!("discovered {} widget element(s)", elements.len());
        let mut ids = Vec::new();
        for mut element in elements {
            if let (Some(base), Some(src)) = (base, element.attributes.get_mut(ATTR_SRC)) {
                *src = resolve_url(base, src.trim());
            }
            if let Some(id) = self.mount(element) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Mount one element. `None` when it has no source or no media element.
    pub fn mount(&mut self, element: WidgetElement) -> Option<WidgetId> {
        let Some(config) = WidgetConfig::from_element(&element) else {
            log::debug!("skipping {} element without a source", element.variant.marker());
            return None;
        };
        let id = WidgetId(self.next_id);
        let Some(bindings) = self.platform.bind_widget(id, &element) else {
            log::debug!("skipping {} element without a video", element.variant.marker());
            return None;
        };
        self.next_id += 1;

        let mut widget = Widget::new(id, config, bindings, self.services.clone());
        if let Some(src) = widget.init() {
            self.prefetcher.spawn(id, src);
        }
        self.widgets.insert(id, widget);
        Some(id)
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(&id)
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.widgets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn view(&self, id: WidgetId) -> Option<WidgetView> {
        self.widgets.get(&id).map(Widget::view)
    }

    pub fn views(&self) -> Vec<WidgetView> {
        self.widgets.values().map(Widget::view).collect()
    }

    /// Dispose a widget and drop it from the arena
    pub fn remove_widget(&mut self, id: WidgetId) -> bool {
        match self.widgets.remove(&id) {
            Some(mut w) => {
                w.dispose();
                true
            }
            None => false,
        }
    }

    fn with_widget(&mut self, id: WidgetId, f: impl FnOnce(&mut Widget)) {
        match self.widgets.get_mut(&id) {
            Some(w) => f(w),
            None => log::trace!("event for unknown {}", id),
        }
    }

    pub fn on_media_event(&mut self, id: WidgetId, event: MediaEvent) {
        self.with_widget(id, |w| w.on_media_event(event));
    }

    /// Route a decoder event to whichever widget owns the session
    pub fn on_decoder_event(&mut self, session: SessionId, event: DecoderEvent) {
        match self.widgets.values_mut().find(|w| w.owns_session(session)) {
            Some(w) => w.on_decoder_event(session, event),
            None => log::trace!("event for unknown session {:?}", session),
        }
    }

    pub fn on_intersection(&mut self, id: WidgetId, entry: IntersectionEntry) {
        self.with_widget(id, |w| w.on_intersection(entry));
    }

    pub fn on_pointer_enter(&mut self, id: WidgetId, now: Instant) {
        self.with_widget(id, |w| w.on_pointer_enter(now));
    }

    pub fn on_pointer_leave(&mut self, id: WidgetId) {
        self.with_widget(id, |w| w.on_pointer_leave());
    }

    pub fn on_pointer_down(&mut self, id: WidgetId, now: Instant) {
        self.with_widget(id, |w| w.on_pointer_down(now));
    }

    /// Pointer pressed on a widget's timeline track or handle. The press
    /// also counts as activity on the widget.
    pub fn on_timeline_pointer_down(
        &mut self,
        id: WidgetId,
        pointer_id: i32,
        x: f64,
        now: Instant,
    ) {
        self.with_widget(id, |w| {
            w.on_pointer_down(now);
            w.on_timeline_pointer_down(pointer_id, x, now);
        });
    }

    /// Window-level move, seen by every widget
    pub fn on_pointer_move(&mut self, x: f64, y: f64, now: Instant) {
        for w in self.widgets.values_mut() {
            w.on_pointer_move(x, y, now);
        }
    }

    /// Window-level release, seen by every widget
    pub fn on_pointer_up(&mut self, now: Instant) {
        for w in self.widgets.values_mut() {
            w.on_pointer_up(now);
        }
    }

    pub fn on_animation_frame(&mut self, id: WidgetId) {
        self.with_widget(id, |w| w.on_animation_frame());
    }

    pub fn on_resize(&mut self) {
        for w in self.widgets.values_mut() {
            w.on_resize();
        }
    }

    pub fn on_fullscreen_change(&mut self, now: Instant) {
        for w in self.widgets.values_mut() {
            w.on_fullscreen_change(now);
        }
    }

    pub fn click_control(&mut self, id: WidgetId, control: Control) {
        self.with_widget(id, |w| w.click_control(control));
    }

    /// Fire due hover deadlines
    pub fn tick(&mut self, now: Instant) {
        for w in self.widgets.values_mut() {
            w.tick(now);
        }
    }

    /// Earliest deadline across all widgets
    pub fn next_deadline(&self) -> Option<Instant> {
        self.widgets.values().filter_map(Widget::next_deadline).min()
    }

    /// Number of manifest prefetches still running
    pub fn pending_prefetches(&self) -> usize {
        self.prefetcher.outstanding()
    }

    /// Apply prefetch results that already arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let results = self.prefetcher.try_collect();
        self.apply_prefetches(results)
    }

    /// Block until every prefetch reported or `timeout` elapsed, then apply
    pub fn wait_for_prefetches(&mut self, timeout: Duration) -> usize {
        let results = self.prefetcher.wait(timeout);
        self.apply_prefetches(results)
    }

    fn apply_prefetches(&mut self, results: Vec<(WidgetId, SourceMeta)>) -> usize {
        let mut applied = 0;
        for (id, meta) in results {
            if let Some(w) = self.widgets.get_mut(&id) {
                log::debug!(
                    "{} metadata {}x{} duration {}",
                    id,
                    meta.width,
                    meta.height,
                    meta.duration
                );
                w.on_meta_resolved(meta);
                applied += 1;
            }
        }
        applied
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        for w in self.widgets.values_mut() {
            w.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::NoopPlatform;
    use crate::widget::{LazyMode, Status};

    const DOC: &str = r#"
        <html><body>
          <div data-bunny-player-init data-player-src="/v/a.m3u8" data-player-lazy="meta"
               data-player-update-size="true">
            <div data-player-before></div>
            <video></video>
            <div data-player-timeline>
              <div data-player-buffered></div>
              <div data-player-progress></div>
              <div data-player-timeline-handle></div>
            </div>
            <span data-player-time-progress></span> / <span data-player-time-duration></span>
            <button data-player-control="playpause"></button>
          </div>
          <div data-bunny-background-init data-player-src="https://cdn.example/b.m3u8"
               data-player-autoplay="true">
            <video></video>
          </div>
          <div data-bunny-player-init><video></video></div>
          <div data-bunny-player-init data-player-src="c.m3u8"></div>
        </body></html>
    "#;

    #[test]
    fn discovers_elements_in_document_order() {
        let found = discover_elements(DOC).unwrap();
        assert_eq!(found.len(), 4);
        assert_eq!(found[0].variant, WidgetVariant::Player);
        assert_eq!(found[1].variant, WidgetVariant::Background);
        let slots = found[0].slots;
        assert!(slots.timeline && slots.progress && slots.buffered && slots.handle && slots.before);
        assert_eq!((slots.time_duration, slots.time_progress), (1, 1));
        assert!(found[0].has_video);
        assert!(!found[3].has_video);
    }

    #[test]
    fn mount_skips_missing_source_and_video() {
        let mut page = Page::new(PageConfig::default(), Arc::new(NoopPlatform::new()));
        let ids = page.mount_document(DOC, Some("https://site.example/page/")).unwrap();
        assert_eq!(ids, vec![WidgetId(1), WidgetId(2)]);

        let first = page.widget(WidgetId(1)).unwrap();
        assert_eq!(first.config().source_url, "https://site.example/v/a.m3u8");
        assert_eq!(first.config().lazy_mode, LazyMode::MetadataOnly);
        assert_eq!(page.pending_prefetches(), 1);

        let bg = page.widget(WidgetId(2)).unwrap();
        assert_eq!(bg.config().variant, WidgetVariant::Background);
        assert!(bg.state().muted);
    }

    #[test]
    fn offline_prefetch_resolves_empty_and_reports_ready() {
        let mut page = Page::new(PageConfig::default(), Arc::new(NoopPlatform::new()));
        page.mount_document(DOC, Some("https://site.example/")).unwrap();
        assert_eq!(page.wait_for_prefetches(Duration::from_secs(5)), 1);
        let w = page.widget(WidgetId(1)).unwrap();
        assert_eq!(w.state().status, Status::Ready);
        assert_eq!(w.visuals().aspect_padding_pct, None);
        assert_eq!(w.visuals().duration_texts, vec![String::new()]);
    }

    #[test]
    fn remove_widget_disposes() {
        let mut page = Page::new(PageConfig::default(), Arc::new(NoopPlatform::new()));
        page.mount_document(DOC, None).unwrap();
        assert!(page.remove_widget(WidgetId(2)));
        assert!(!page.remove_widget(WidgetId(2)));
        assert_eq!(page.ids(), vec![WidgetId(1)]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut page = Page::new(PageConfig::default(), Arc::new(NoopPlatform::new()));
        page.on_media_event(WidgetId(42), MediaEvent::Play);
        page.on_decoder_event(SessionId(42), DecoderEvent::MediaAttached);
        assert!(page.is_empty());
    }
}
