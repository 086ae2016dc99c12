//! Time formatting and text slot helpers

fn pad2(n: u64) -> String {
    format!("{:02}", n)
}

/// Format a position in seconds as `MM:SS`, or `H:MM:SS` from one hour on.
///
/// Negative, NaN and infinite inputs render as `00:00`.
///
/// ```
/// assert_eq!(rfmedia::time::format_time(65.0), "01:05");
/// assert_eq!(rfmedia::time::format_time(3661.0), "1:01:01");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let s = seconds.floor() as u64;
    let h = s / 3600;
    let m = (s % 3600) / 60;
    let r = s % 60;
    if h > 0 {
        format!("{}:{}:{}", h, pad2(m), pad2(r))
    } else {
        format!("{}:{}", pad2(m), pad2(r))
    }
}

/// Write `text` into every node of a text slot group.
///
/// Returns `true` when at least one node changed.
pub fn set_text(nodes: &mut [String], text: &str) -> bool {
    let mut changed = false;
    for node in nodes.iter_mut() {
        if node != text {
            node.clear();
            node.push_str(text);
            changed = true;
        }
    }
    changed
}
