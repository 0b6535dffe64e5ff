use super::*;
use crate::text::glyphs::BlockGlyphs;

fn cfg() -> RenderConfig {
    RenderConfig {
        width: 320,
        height: 240,
        text_box_width: 200,
        text_box_height: 100,
        text_box_y: 130,
        label: "test".to_string(),
    }
}

fn speaker(portrait: bool) -> Speaker {
    Speaker {
        name: "Pens".to_string(),
        color: Rgba8Premul::opaque(255, 0, 0),
        portrait: portrait.then(|| FrameRGBA::filled(8, 8, Rgba8Premul::opaque(0, 255, 0))),
    }
}

fn dialogue(text: &str) -> DialogueBox {
    DialogueBox::new(&speaker(false), text, &BlockGlyphs, &cfg(), Fps::default(), 12.0)
}

fn white_pixels(f: &FrameRGBA) -> usize {
    f.data.chunks_exact(4).filter(|p| *p == [255, 255, 255, 255]).count()
}

#[test]
fn frame_count_is_reveal_plus_hold() {
    let b = dialogue("Hello");
    assert_eq!(b.frame_count(), 13 + 60);
    assert_eq!(b.frames().count() as u64, b.frame_count());
}

#[test]
fn frame_count_grows_with_text() {
    let texts = ["a", "ab", "abc def", "abc def ghi jkl mno pqr stu vwx"];
    let counts: Vec<u64> = texts.iter().map(|t| dialogue(t).frame_count()).collect();
    assert!(counts.windows(2).all(|w| w[0] < w[1]), "{counts:?}");
}

#[test]
fn first_frame_shows_one_character_and_last_shows_all() {
    let full = dialogue("Hello there");
    let single = dialogue("H");
    assert_eq!(full.frame(0), single.frame(single.frame_count() - 1));

    let last = full.frame(full.frame_count() - 1);
    assert_ne!(full.frame(0), last);
    assert_eq!(last, full.frame(full.clock().typewriter_frames()));
    assert_eq!(last, full.frame(10_000));
}

#[test]
fn reveal_only_adds_pixels() {
    let b = dialogue("one two three four five six seven eight nine ten");
    assert!(b.layout().rows().len() > 1);
    let mut prev = 0;
    for f in b.frames() {
        let n = white_pixels(&f);
        assert!(n >= prev);
        prev = n;
    }
}

#[test]
fn static_parts_are_drawn() {
    let b = DialogueBox::new(&speaker(true), "", &BlockGlyphs, &cfg(), Fps::default(), 12.0);
    let f = b.frame(0);
    assert_eq!((f.width, f.height), (200, 100));
    assert_eq!(f.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(f.pixel(100, 50), BOX_FILL.to_array());
    // Portrait: 24px square at the padding offset.
    assert_eq!(f.pixel(6, 6), [0, 255, 0, 255]);
    assert_eq!(f.pixel(29, 29), [0, 255, 0, 255]);
    // Name in its color, right of the portrait.
    assert!(f.data.chunks_exact(4).any(|p| p == [255, 0, 0, 255]));
    assert_eq!(b.frame_count(), 60);
}
