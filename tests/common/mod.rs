#![allow(dead_code)]

use rfmedia::platform::{NoopPlatform, StaticCapabilities};
use rfmedia::{Page, PageConfig, WidgetId};
use std::collections::HashMap;
use std::sync::Arc;
use tiny_http::{Header, Response, Server};

/// Serve fixed bodies by path on an ephemeral port until the process exits.
/// Unknown paths answer 404. Returns the base URL.
pub fn serve(routes: &[(&str, &str)]) -> String {
    let routes: HashMap<String, String> =
        routes.iter().map(|(p, b)| (p.to_string(), b.to_string())).collect();
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let resp = match routes.get(request.url()) {
                Some(body) => Response::from_string(body.clone())
                    .with_header("Content-Type: text/plain".parse::<Header>().unwrap()),
                None => Response::from_string("missing").with_status_code(404),
            };
            let _ = request.respond(resp);
        }
    });
    base
}

pub fn platform(native: bool, decoder: bool) -> Arc<NoopPlatform> {
    Arc::new(NoopPlatform::new().with_capabilities(StaticCapabilities::new(native, decoder)))
}

pub fn player_html(attrs: &str) -> String {
    format!(
        r#"<div data-bunny-player-init data-player-src="https://cdn.example/v/playlist.m3u8" {}>
             <div data-player-before></div>
             <video></video>
             <div data-player-timeline>
               <div data-player-progress></div><div data-player-timeline-handle></div>
             </div>
             <span data-player-time-progress></span><span data-player-time-duration></span>
           </div>"#,
        attrs
    )
}

/// A page holding one player widget
pub fn single(attrs: &str, native: bool, decoder: bool) -> (Page, Arc<NoopPlatform>, WidgetId) {
    let platform = platform(native, decoder);
    let mut page = Page::new(PageConfig::default(), platform.clone());
    let ids = page.mount_document(&player_html(attrs), None).unwrap();
    assert_eq!(ids.len(), 1);
    (page, platform, ids[0])
}
