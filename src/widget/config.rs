//! Declarative widget configuration, read once from the element's attributes.

use serde::Serialize;
use std::collections::BTreeMap;

pub const PLAYER_MARKER: &str = "data-bunny-player-init";
pub const BACKGROUND_MARKER: &str = "data-bunny-background-init";

pub const ATTR_SRC: &str = "data-player-src";
pub const ATTR_LAZY: &str = "data-player-lazy";
pub const ATTR_AUTOPLAY: &str = "data-player-autoplay";
pub const ATTR_MUTED: &str = "data-player-muted";
pub const ATTR_UPDATE_SIZE: &str = "data-player-update-size";

/// Which widget flavour an element declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetVariant {
    /// Full controls: scrubbing, hover, fullscreen, time texts, size sync
    #[default]
    Player,
    /// Background loop: status machine, autoplay, play/pause and mute only
    Background,
}

impl WidgetVariant {
    pub fn marker(&self) -> &'static str {
        match self {
            WidgetVariant::Player => PLAYER_MARKER,
            WidgetVariant::Background => BACKGROUND_MARKER,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, WidgetVariant::Player)
    }
}

/// How early the backend is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LazyMode {
    /// Attach on mount
    #[default]
    None,
    /// Attach on the first play intent
    Deferred,
    /// Resolve duration and aspect ratio up front, attach on first play intent
    MetadataOnly,
}

impl LazyMode {
    pub fn is_lazy(&self) -> bool {
        !matches!(self, LazyMode::None)
    }
}

/// Aspect-ratio sync of the placeholder element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeSync {
    #[default]
    Off,
    SizeFromMetadata,
    /// Cropping is left to styling; nothing is written
    CoverFit,
}

/// Optional UI pieces found inside the widget element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Slots {
    pub timeline: bool,
    pub progress: bool,
    pub buffered: bool,
    pub handle: bool,
    pub time_duration: usize,
    pub time_progress: usize,
    pub before: bool,
}

/// A discovered element: its attributes and the slots under it
#[derive(Debug, Clone, Default, Serialize)]
pub struct WidgetElement {
    pub variant: WidgetVariant,
    pub attributes: BTreeMap<String, String>,
    pub slots: Slots,
    pub has_video: bool,
}

impl WidgetElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    fn flag(&self, name: &str) -> bool {
        self.attr(name) == Some("true")
    }
}

/// Immutable per-widget configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetConfig {
    pub variant: WidgetVariant,
    pub source_url: String,
    pub lazy_mode: LazyMode,
    pub autoplay: bool,
    pub muted: bool,
    pub size_sync: SizeSync,
    pub slots: Slots,
}

impl WidgetConfig {
    /// Read configuration from an element. `None` when the source attribute is
    /// missing or blank; such widgets are skipped silently.
    pub fn from_element(element: &WidgetElement) -> Option<Self> {
        let source_url =
            element.attr(ATTR_SRC).map(str::trim).filter(|s| !s.is_empty())?.to_string();
        let variant = element.variant;

        let lazy_mode = match (element.attr(ATTR_LAZY), variant) {
            (Some("true"), _) => LazyMode::Deferred,
            (Some("meta"), WidgetVariant::Player) => LazyMode::MetadataOnly,
            _ => LazyMode::None,
        };

        let (size_sync, slots) = match variant {
            WidgetVariant::Player => {
                let sync = match element.attr(ATTR_UPDATE_SIZE) {
                    Some("true") => SizeSync::SizeFromMetadata,
                    Some("cover") => SizeSync::CoverFit,
                    _ => SizeSync::Off,
                };
                (sync, element.slots)
            }
            WidgetVariant::Background => (SizeSync::Off, Slots::default()),
        };

        Some(Self {
            variant,
            source_url,
            lazy_mode,
            autoplay: element.flag(ATTR_AUTOPLAY),
            muted: element.flag(ATTR_MUTED),
            size_sync,
            slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(variant: WidgetVariant, attrs: &[(&str, &str)]) -> WidgetElement {
        WidgetElement {
            variant,
            attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            slots: Slots { timeline: true, time_duration: 1, ..Default::default() },
            has_video: true,
        }
    }

    #[test]
    fn missing_source_is_skipped() {
        assert!(WidgetConfig::from_element(&element(WidgetVariant::Player, &[])).is_none());
        let blank = element(WidgetVariant::Player, &[(ATTR_SRC, "  ")]);
        assert!(WidgetConfig::from_element(&blank).is_none());
    }

    #[test]
    fn player_reads_all_flags() {
        let cfg = WidgetConfig::from_element(&element(
            WidgetVariant::Player,
            &[
                (ATTR_SRC, "https://cdn.example/a.m3u8"),
                (ATTR_LAZY, "meta"),
                (ATTR_AUTOPLAY, "true"),
                (ATTR_MUTED, "false"),
                (ATTR_UPDATE_SIZE, "cover"),
            ],
        ))
        .unwrap();
        assert_eq!(cfg.lazy_mode, LazyMode::MetadataOnly);
        assert!(cfg.autoplay);
        assert!(!cfg.muted);
        assert_eq!(cfg.size_sync, SizeSync::CoverFit);
        assert!(cfg.slots.timeline);
    }

    #[test]
    fn background_ignores_meta_mode_and_slots() {
        let cfg = WidgetConfig::from_element(&element(
            WidgetVariant::Background,
            &[(ATTR_SRC, "a.m3u8"), (ATTR_LAZY, "meta"), (ATTR_UPDATE_SIZE, "true")],
        ))
        .unwrap();
        assert_eq!(cfg.lazy_mode, LazyMode::None);
        assert_eq!(cfg.size_sync, SizeSync::Off);
        assert!(!cfg.slots.timeline);
    }

    #[test]
    fn unknown_values_fall_back_to_defaults() {
        let cfg = WidgetConfig::from_element(&element(
            WidgetVariant::Player,
            &[(ATTR_SRC, "a.m3u8"), (ATTR_LAZY, "yes"), (ATTR_AUTOPLAY, "1")],
        ))
        .unwrap();
        assert_eq!(cfg.lazy_mode, LazyMode::None);
        assert!(!cfg.autoplay);
    }
}
