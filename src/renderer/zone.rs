use crate::config::ZoneEntry;
use crate::layout::Rect;
use crate::renderer::{ColorScheme, DrawOp, FontPair, TextAlign, TextOverflow};
use crate::time_utils::{self, WallClock};

/// Draw one zone band: background in the period's colour, the zone name in
/// the top third and the local time below it.
pub fn render_zone(zone: &ZoneEntry, local_time: WallClock, region: Rect, fonts: &FontPair) -> Vec<DrawOp> {
    let scheme = ColorScheme::for_period(time_utils::classify_day_night(local_time.hour));
    let (label_rect, time_rect) = region.split_thirds();

    vec![
        DrawOp::FillRect { rect: region, color: scheme.background },
        DrawOp::Text {
            rect: label_rect,
            text: zone.name.clone(),
            font: fonts.thin,
            align: TextAlign::Center,
            overflow: TextOverflow::TrailingEllipsis,
            color: scheme.text,
        },
        DrawOp::Text {
            rect: time_rect,
            text: local_time.format_time(),
            font: fonts.thick,
            align: TextAlign::Center,
            overflow: TextOverflow::TrailingEllipsis,
            color: scheme.text,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FontHandle;
    use crate::renderer::Color;

    fn fonts() -> FontPair {
        FontPair { thin: FontHandle(1), thick: FontHandle(2) }
    }

    fn tokyo() -> ZoneEntry {
        ZoneEntry { name: "Tokyo".into(), offset: 540 }
    }

    #[test]
    fn night_zone_is_drawn_inverted() {
        let region = Rect::new(0, 56, 144, 56);
        let ops = render_zone(&tokyo(), WallClock::new(19, 30), region, &fonts());
        assert_eq!(
            ops,
            vec![
                DrawOp::FillRect { rect: region, color: Color::Black },
                DrawOp::Text {
                    rect: Rect::new(0, 56, 144, 18),
                    text: "Tokyo".into(),
                    font: FontHandle(1),
                    align: TextAlign::Center,
                    overflow: TextOverflow::TrailingEllipsis,
                    color: Color::White,
                },
                DrawOp::Text {
                    rect: Rect::new(0, 74, 144, 38),
                    text: "19:30".into(),
                    font: FontHandle(2),
                    align: TextAlign::Center,
                    overflow: TextOverflow::TrailingEllipsis,
                    color: Color::White,
                },
            ]
        );
    }

    #[test]
    fn day_zone_uses_black_text_on_white() {
        let ops = render_zone(&tokyo(), WallClock::new(6, 0), Rect::new(0, 0, 144, 42), &fonts());
        assert!(matches!(ops[0], DrawOp::FillRect { color: Color::White, .. }));
        for op in &ops[1..] {
            assert!(matches!(op, DrawOp::Text { color: Color::Black, .. }));
        }
    }

    #[test]
    fn long_names_are_passed_through_for_truncation() {
        let zone = ZoneEntry { name: "Santa Cruz de la Sierra".into(), offset: -240 };
        let ops = render_zone(&zone, WallClock::new(12, 0), Rect::new(0, 0, 144, 56), &fonts());
        match &ops[1] {
            DrawOp::Text { text, overflow, .. } => {
                assert_eq!(text, "Santa Cruz de la Sierra");
                assert_eq!(*overflow, TextOverflow::TrailingEllipsis);
            }
            other => panic!("expected label, got {:?}", other),
        }
    }

    #[test]
    fn rendering_is_idempotent() {
        let region = Rect::new(0, 112, 144, 56);
        let time = WallClock::new(23, 59);
        let first = render_zone(&tokyo(), time, region, &fonts());
        let second = render_zone(&tokyo(), time, region, &fonts());
        assert_eq!(first, second);
    }
}
