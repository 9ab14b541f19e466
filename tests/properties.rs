//! Property tests for the screen model, pen and converter

use std::num::NonZeroUsize;

use ansiart_utf8::core::{Pen, Position, Screen};
use ansiart_utf8::{Config, Converter, UnhandledPolicy};
use proptest::prelude::*;

fn screen(width: usize, height: usize) -> Screen {
    let mut screen = Screen::new(NonZeroUsize::new(width).unwrap());
    screen.touch(height);
    screen
}

proptest! {
    #[test]
    fn test_relative_motion_clamps(
        width in 1usize..200,
        height in 1usize..50,
        col in 1usize..300,
        row in 1usize..80,
        dx in any::<isize>(),
        dy in any::<isize>(),
    ) {
        let screen = screen(width, height);
        let mut pos = Position::new(col, row.min(height));
        screen.move_relative(&mut pos, dx, dy);
        prop_assert!(pos.col >= 1 && pos.col <= width);
        prop_assert!(pos.row >= 1 && pos.row <= height);
        prop_assert_eq!(screen.height(), height);
    }

    #[test]
    fn test_absolute_growth(
        width in 1usize..40,
        text in proptest::collection::vec(0x20u8..0x7f, 0..40),
        target in 1usize..100,
    ) {
        let mut screen = screen(width, 1);
        for (i, &byte) in text.iter().take(width).enumerate() {
            screen.put(Position::new(i + 1, 1), char::from(byte), Pen::new()).unwrap();
        }
        let before = screen.lines()[0].clone();
        let height = screen.height();

        let mut pos = Position::HOME;
        screen.set_absolute(&mut pos, target, 1);
        prop_assert_eq!(screen.height(), height.max(target));
        prop_assert_eq!(&screen.lines()[0], &before);
    }

    #[test]
    fn test_reset_is_idempotent(codes in proptest::collection::vec(0u16..=255, 0..12)) {
        let mut pen = Pen::new();
        let _ = pen.merge(&codes);
        pen.merge(&[0]).unwrap();
        prop_assert_eq!(pen, Pen::new());
        pen.merge(&[0]).unwrap();
        prop_assert_eq!(pen, Pen::new());
    }

    #[test]
    fn test_arbitrary_input_never_panics(
        input in proptest::collection::vec(any::<u8>(), 0..512),
        width in 1usize..120,
        strict in any::<bool>(),
    ) {
        let config = Config {
            width,
            max_rows: 200,
            strict_terminators: strict,
            unhandled: UnhandledPolicy::Skip,
            ..Default::default()
        };
        let mut converter = Converter::new(config).unwrap();
        let mut out = Vec::new();
        if let Ok(summary) = converter.convert(&input[..], &mut out) {
            prop_assert!(summary.rows >= 1 && summary.rows <= 200);
            prop_assert_eq!(String::from_utf8(out).unwrap().lines().count(), summary.rows);
        }
    }

    #[test]
    fn test_row_budget_respected(
        input in proptest::collection::vec(any::<u8>(), 0..256),
        budget in 1usize..64,
    ) {
        let config = Config {
            width: 20,
            max_bytes_per_row: budget,
            unhandled: UnhandledPolicy::Skip,
            ..Default::default()
        };
        let mut converter = Converter::new(config).unwrap();
        if let Ok(out) = converter.convert_to_string(&input) {
            for line in out.lines() {
                let content = line
                    .strip_prefix("\x1b[0m")
                    .and_then(|l| l.strip_suffix("\x1b[0m"))
                    .unwrap();
                prop_assert!(content.len() <= budget);
            }
        }
    }
}
