//! XOR sprite compositing.

use crate::{Framebuffer, SpriteWrap, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Width of a sprite row in pixels.
pub const SPRITE_WIDTH: usize = 8;

/// XORs `rows` onto `framebuffer` with the origin at (`x`, `y`).
///
/// The origin is wrapped modulo the display size. Pixels past the right or
/// bottom edge are dropped under [`SpriteWrap::Clip`] and wrapped under
/// [`SpriteWrap::Wrap`]. Returns `true` when any lit pixel was turned off.
pub fn draw_sprite(
    framebuffer: &mut Framebuffer,
    x: u8,
    y: u8,
    rows: &[u8],
    wrap: SpriteWrap,
) -> bool {
    let origin_x = usize::from(x) % DISPLAY_WIDTH;
    let origin_y = usize::from(y) % DISPLAY_HEIGHT;
    let mut collision = false;

    for (row_offset, row) in rows.iter().enumerate() {
        let Some(py) = place(origin_y + row_offset, DISPLAY_HEIGHT, wrap) else {
            break;
        };

        for column in 0..SPRITE_WIDTH {
            if row & (0x80 >> column) == 0 {
                continue;
            }
            let Some(px) = place(origin_x + column, DISPLAY_WIDTH, wrap) else {
                break;
            };
            collision |= framebuffer.toggle(px, py);
        }
    }

    collision
}

const fn place(coord: usize, limit: usize, wrap: SpriteWrap) -> Option<usize> {
    match wrap {
        SpriteWrap::Clip if coord >= limit => None,
        SpriteWrap::Clip => Some(coord),
        SpriteWrap::Wrap => Some(coord % limit),
    }
}

#[cfg(test)]
mod tests {
    use super::draw_sprite;
    use crate::{Framebuffer, SpriteWrap, DISPLAY_HEIGHT, DISPLAY_WIDTH};

    #[test]
    fn rows_are_drawn_most_significant_bit_first() {
        let mut fb = Framebuffer::default();
        let collision = draw_sprite(&mut fb, 0, 0, &[0b1000_0001], SpriteWrap::Clip);

        assert!(!collision);
        assert!(fb.pixel(0, 0));
        assert!(fb.pixel(7, 0));
        assert_eq!(fb.lit_count(), 2);
    }

    #[test]
    fn redrawing_erases_and_reports_collision() {
        let mut fb = Framebuffer::default();
        draw_sprite(&mut fb, 10, 5, &[0xF0, 0x90], SpriteWrap::Clip);
        let collision = draw_sprite(&mut fb, 10, 5, &[0xF0, 0x90], SpriteWrap::Clip);

        assert!(collision);
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn clip_drops_pixels_past_right_and_bottom_edges() {
        let mut fb = Framebuffer::default();
        let x = u8::try_from(DISPLAY_WIDTH - 4).expect("fits");
        let y = u8::try_from(DISPLAY_HEIGHT - 1).expect("fits");
        draw_sprite(&mut fb, x, y, &[0xFF, 0xFF], SpriteWrap::Clip);

        assert_eq!(fb.lit_count(), 4);
        assert!(!fb.pixel(0, 0));
        assert!(!fb.pixel(0, DISPLAY_HEIGHT - 1));
    }

    #[test]
    fn wrap_places_overflow_on_opposite_edges() {
        let mut fb = Framebuffer::default();
        let x = u8::try_from(DISPLAY_WIDTH - 4).expect("fits");
        let y = u8::try_from(DISPLAY_HEIGHT - 1).expect("fits");
        draw_sprite(&mut fb, x, y, &[0xFF, 0xFF], SpriteWrap::Wrap);

        assert_eq!(fb.lit_count(), 16);
        assert!(fb.pixel(0, DISPLAY_HEIGHT - 1));
        assert!(fb.pixel(3, 0));
        assert!(fb.pixel(DISPLAY_WIDTH - 1, 0));
    }

    #[test]
    fn origin_is_wrapped_before_drawing() {
        let mut fb = Framebuffer::default();
        draw_sprite(&mut fb, 64 + 2, 32 + 1, &[0x80], SpriteWrap::Clip);
        assert!(fb.pixel(2, 1));
        assert_eq!(fb.lit_count(), 1);
    }
}
