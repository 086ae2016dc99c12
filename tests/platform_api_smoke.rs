use rfmedia::platform::{
    DecoderConfig, FrameScheduler, Fullscreen, MediaSurface, NoopPlatform, PlatformApi, Preload,
    StaticCapabilities,
    ViewportObserver, HLS_MIME,
};
use rfmedia::{WidgetElement, WidgetId};

#[test]
fn platform_noop_smoke() {
    let p = NoopPlatform::new().with_capabilities(StaticCapabilities::new(true, true));

    // capabilities
    let caps = p.capabilities();
    assert!(caps.supports_native(HLS_MIME));
    assert!(!caps.supports_native("video/mp4"));
    assert!(caps.segmented_decoder_available());

    // decoder sessions
    let mut s = p.decoder_factory().create_session(&DecoderConfig::default()).unwrap();
    s.load_source("https://cdn.example/a.m3u8");
    s.destroy();
    assert!(p.decoders().live_sessions().is_empty());

    // surface bound per widget
    let element = WidgetElement { has_video: true, ..Default::default() };
    let bindings = p.bind_widget(WidgetId(5), &element).unwrap();
    bindings.surface.set_preload(Preload::None);
    bindings.surface.set_source(Some("https://cdn.example/a.m3u8"));
    assert!(bindings.surface.play().is_ok());
    let surface = p.surface(WidgetId(5)).unwrap();
    assert_eq!(surface.preload(), Preload::None);
    assert!(!surface.is_paused());
    bindings.surface.reset();
    assert!(surface.source().is_none());

    // frames, viewport, fullscreen
    let h = p.frame_scheduler().request_frame(WidgetId(5));
    p.frame_scheduler().cancel_frame(h);
    assert!(!p.frames().is_pending(WidgetId(5)));
    p.viewport_observer().observe(WidgetId(5), 0.1);
    assert_eq!(p.viewport().threshold(WidgetId(5)), Some(0.1));
    p.fullscreen().enter(WidgetId(5));
    assert!(p.fullscreen_state().is_active(WidgetId(5)));
}
