//! End-to-end rendering of a chain built through several kinds of functions.

use pretty_assertions::assert_eq;
use stacktrace::{
    FormatMode, TracedError, default_format, new_error, propagate, render, render_default,
    set_default_format,
};
use std::sync::{LazyLock, Mutex};

// Serialization lock for tests touching the process-wide format mode
static TEST_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

// ── Call sites ────────────────────────────────────────────────────

#[inline(never)]
fn start_doing() -> (Option<TracedError>, u32) {
    (Some(new_error("failed to start doing")), line!())
}

pub struct PublicObj;

impl PublicObj {
    #[inline(never)]
    pub fn do_public(&self, err: Option<TracedError>) -> Option<TracedError> {
        propagate(err, "")
    }

    #[inline(never)]
    fn do_private(&self, err: Option<TracedError>) -> Option<TracedError> {
        propagate(err, "")
    }
}

struct PrivateObj;

impl PrivateObj {
    #[inline(never)]
    pub fn do_public(&self, err: Option<TracedError>) -> Option<TracedError> {
        propagate(err, "")
    }

    #[inline(never)]
    fn do_private(&self, err: Option<TracedError>) -> Option<TracedError> {
        propagate(err, "")
    }
}

struct PtrObj {
    calls: usize,
}

impl PtrObj {
    #[inline(never)]
    fn do_ptr(&mut self, err: Option<TracedError>) -> Option<TracedError> {
        self.calls += 1;
        propagate(err, "pointedly")
    }
}

#[inline(never)]
fn do_closure(err: Option<TracedError>) -> Option<TracedError> {
    let close = move || propagate(err, "so closed");
    close()
}

fn build_chain() -> (TracedError, u32) {
    let (err, root_line) = start_doing();
    let err = PublicObj.do_public(err);
    let err = PublicObj.do_private(err);
    let err = PrivateObj.do_public(err);
    let err = PrivateObj.do_private(err);
    let mut ptr = PtrObj { calls: 0 };
    let err = ptr.do_ptr(err);
    assert_eq!(ptr.calls, 1);
    let err = do_closure(err).expect("chain of present errors stays present");
    (err, root_line)
}

// ── Tests ─────────────────────────────────────────────────────────

#[test]
fn every_layer_records_its_function() {
    let (err, root_line) = build_chain();

    let functions: Vec<&str> = err.chain().map(|layer| layer.frame().function()).collect();
    assert_eq!(functions.len(), 7);
    assert!(functions[0].starts_with("do_closure::{closure"), "{functions:?}");
    assert_eq!(
        &functions[1..],
        [
            "PtrObj::do_ptr",
            "PrivateObj::do_private",
            "PrivateObj::do_public",
            "PublicObj::do_private",
            "PublicObj::do_public",
            "start_doing",
        ]
    );

    for layer in err.chain() {
        assert!(layer.frame().file().ends_with("chain.rs"), "{}", layer.frame());
        assert!(layer.frame().line() > 0);
    }
    let root = err.chain().last().expect("root layer");
    assert_eq!(root.frame().line(), root_line);
}

#[test]
fn full_rendering_stacks_pass_through_frames() {
    let (err, _) = build_chain();
    let frames: Vec<String> = err
        .chain()
        .map(|layer| format!(" --- at {} ---", layer.frame()))
        .collect();

    let expected = [
        "so closed",
        frames[0].as_str(),
        "Caused by: pointedly",
        frames[1].as_str(),
        frames[2].as_str(),
        frames[3].as_str(),
        frames[4].as_str(),
        frames[5].as_str(),
        "Caused by: failed to start doing",
        frames[6].as_str(),
    ]
    .join("\n");

    assert_eq!(render(&err, FormatMode::Full), expected);
    assert_eq!(format!("{err:?}"), expected);
}

#[test]
fn brief_rendering_keeps_only_messages() {
    let (err, _) = build_chain();
    assert_eq!(
        render(&err, FormatMode::Brief),
        "so closed\nCaused by: pointedly\nCaused by: failed to start doing"
    );
}

#[test]
fn display_follows_process_default() {
    let _guard = TEST_LOCK.lock().unwrap();
    let (err, _) = build_chain();

    set_default_format(FormatMode::Full);
    let full = render(&err, FormatMode::Full);
    assert_eq!(err.to_string(), full);
    assert_eq!(format!("{err}"), full);
    assert_eq!(render_default(&err), full);

    set_default_format(FormatMode::Brief);
    assert_eq!(default_format(), FormatMode::Brief);
    assert_eq!(err.to_string(), render(&err, FormatMode::Brief));

    set_default_format(FormatMode::Full);
}

#[test]
fn explicit_mode_overrides_process_default() {
    let _guard = TEST_LOCK.lock().unwrap();
    let (err, _) = build_chain();

    set_default_format(FormatMode::Brief);
    assert_eq!(
        err.display(FormatMode::Full).to_string(),
        render(&err, FormatMode::Full)
    );
    set_default_format(FormatMode::Full);
}

#[test]
fn foreign_root_is_rendered_last() {
    let io = std::io::Error::other("connection reset");
    let err = propagate(Some(io), "fetching page").expect("present");
    let rendered = render(&err, FormatMode::Full);

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "fetching page");
    assert!(lines[1].ends_with("(foreign_root_is_rendered_last) ---"), "{}", lines[1]);
    assert_eq!(lines[2], "Caused by: connection reset");
}
