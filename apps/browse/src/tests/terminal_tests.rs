use std::sync::{Arc, Mutex};

use shared::domain::{ArtworkId, ArtworkItem, ImageUri};

use super::*;

fn transcript_surface() -> (TerminalSurface, Arc<Mutex<Vec<u8>>>) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let surface = TerminalSurface::with_writer(buffer.clone());
    (surface, buffer)
}

fn transcript(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(buffer.lock().expect("buffer").clone()).expect("utf8")
}

#[test]
fn describes_each_operation() {
    let item = ArtworkItem::new(ArtworkId(1), "com.example.featured", "img://a").with_title("Dawn");

    assert_eq!(
        describe(&ListOp::Insert {
            index: 0,
            item: item.clone()
        }),
        "+ [0] img://a Dawn"
    );
    assert_eq!(
        describe(&ListOp::Remove {
            index: 2,
            image_uri: ImageUri::new("img://z")
        }),
        "- [2] img://z"
    );
    assert_eq!(describe(&ListOp::Move { from: 3, to: 0 }), "> [3] -> [0]");
    assert_eq!(
        describe(&ListOp::Update {
            index: 1,
            item: item.with_title("  ")
        }),
        "~ [1] img://a (untitled)"
    );
}

#[test]
fn writes_one_line_per_call() {
    let (surface, buffer) = transcript_surface();

    surface.set_refreshing(true);
    surface.set_refreshing(false);
    surface.show_message("Set “Dawn” as wallpaper");
    surface.show_error(&BrowseError::ItemOutOfRange { index: 4, len: 2 });

    let text = transcript(&buffer);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "refreshing...");
    assert_eq!(lines[1], "refresh done");
    assert!(lines[2].contains("Dawn"));
    assert!(lines[3].starts_with("! no artwork at position 4"));
}
