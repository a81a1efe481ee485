//! Turning a session into a flat list of colored quads.
//!
//! Extraction is pure: it needs no GPU and no window, so the exact picture a
//! frame would show can be checked in ordinary tests. The GPU renderer only
//! uploads what this produces.

use pixelhop_level::geometry::Rect;

use super::sprite::SpriteSheet;
use crate::session::Session;

/// Width and height of one player sprite frame, px.
pub const SPRITE_SIZE: f64 = 32.0;

/// Source x of the sprite frame for each facing in the player sheet.
pub const SPRITE_FRAME_RIGHT: u32 = 0;
pub const SPRITE_FRAME_LEFT: u32 = 64;

/// Placeholder sprite fill when no sheet is loaded, one shade per facing.
const COLOR_SPRITE_RIGHT: [f32; 4] = [0.2, 0.55, 1.0, 1.0];
const COLOR_SPRITE_LEFT: [f32; 4] = [0.1, 0.35, 0.8, 1.0];

/// Half-transparent red, the hitbox overlay color.
const COLOR_HITBOX: [f32; 4] = [1.0, 0.0, 0.0, 0.5];
const HITBOX_LINE: f64 = 1.0;

/// What a quad represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Tile,
    /// The player sprite; `frame_x` is the source x in the sprite sheet.
    Sprite { frame_x: u32 },
    /// One edge of the hitbox outline.
    Hitbox,
}

/// A colored rectangle in virtual pixels.
///
/// `x`/`y` is the rectangle's center, as the renderer's quad builder
/// expects; [`DrawCommand::from_rect`] converts from top-left rectangles.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// RGBA, each channel `0.0..=1.0`.
    pub color: [f32; 4],
    pub kind: DrawKind,
}

impl DrawCommand {
    pub fn from_rect(rect: &Rect, color: [f32; 4], kind: DrawKind) -> Self {
        Self {
            x: (rect.left() + rect.width() / 2.0) as f32,
            y: (rect.top() + rect.height() / 2.0) as f32,
            width: rect.width() as f32,
            height: rect.height() as f32,
            color,
            kind,
        }
    }

    /// Top-left corner, px.
    pub fn top_left(&self) -> (f32, f32) {
        (self.x - self.width / 2.0, self.y - self.height / 2.0)
    }
}

/// Draw list for one frame, back to front: visible tiles in scan order, then
/// the sprite at the interpolated position, then the hitbox outline.
///
/// The sprite is a single placeholder quad; see
/// [`extract_draw_commands_with_sheet`] for the sheet-backed version.
pub fn extract_draw_commands(session: &Session, interpolation: f64) -> Vec<DrawCommand> {
    extract_draw_commands_with_sheet(session, interpolation, None)
}

/// [`extract_draw_commands`], drawing the sprite from `sheet` when given:
/// one quad per run of same-colored pixels of the facing's frame.
pub fn extract_draw_commands_with_sheet(
    session: &Session,
    interpolation: f64,
    sheet: Option<&SpriteSheet>,
) -> Vec<DrawCommand> {
    let grid = session.grid();
    let body = session.body();
    let mut commands = Vec::with_capacity(grid.solid_count() + 5);

    for (_, tile) in grid.tiles() {
        if tile.visible {
            commands.push(DrawCommand::from_rect(
                &tile.collider,
                tile.color.to_linear_f32(),
                DrawKind::Tile,
            ));
        }
    }

    let at = body.render_position(interpolation);
    let (color, frame_x) = if body.facing_left() {
        (COLOR_SPRITE_LEFT, SPRITE_FRAME_LEFT)
    } else {
        (COLOR_SPRITE_RIGHT, SPRITE_FRAME_RIGHT)
    };
    let kind = DrawKind::Sprite { frame_x };
    match sheet {
        Some(sheet) => commands.extend(sheet.frame_runs(frame_x).into_iter().map(|run| {
            let rect = Rect::new(
                at.x + f64::from(run.x),
                at.y + f64::from(run.y),
                f64::from(run.len),
                1.0,
            );
            DrawCommand::from_rect(&rect, run.color.to_linear_f32(), kind)
        })),
        None => commands.push(DrawCommand::from_rect(
            &Rect::new(at.x, at.y, SPRITE_SIZE, SPRITE_SIZE),
            color,
            kind,
        )),
    }

    let hitbox = body.hitbox();
    let outline = Rect::new(at.x + hitbox.offset_x, at.y + hitbox.offset_y, hitbox.width, hitbox.height);
    commands.extend(
        outline_edges(&outline, HITBOX_LINE)
            .iter()
            .map(|edge| DrawCommand::from_rect(edge, COLOR_HITBOX, DrawKind::Hitbox)),
    );
    commands
}

/// Four `thickness`-wide rectangles lining the inside of `rect`.
fn outline_edges(rect: &Rect, thickness: f64) -> [Rect; 4] {
    let t = thickness.min(rect.width() / 2.0).min(rect.height() / 2.0);
    let inner_height = (rect.height() - 2.0 * t).max(0.0);
    [
        Rect::new(rect.left(), rect.top(), rect.width(), t),
        Rect::new(rect.left(), rect.bottom() - t, rect.width(), t),
        Rect::new(rect.left(), rect.top() + t, t, inner_height),
        Rect::new(rect.right() - t, rect.top() + t, t, inner_height),
    ]
}
