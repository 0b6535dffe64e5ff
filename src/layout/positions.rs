//! Sprite anchor resolution.
//!
//! Anchors are sprite bottom-center points in frame pixels. Named positions come from the
//! location's catalog entry, scaled from its reference canvas to the active frame; everything
//! else lands on a deterministic fallback inside the ground zone. A final geometric pass moves
//! overlapping sprites apart.

use std::collections::{BTreeMap, BTreeSet};

use crate::assets::catalog::{Catalog, LocationProfile};
use crate::assets::sprites::{SPRITE_MAX_HEIGHT, SPRITE_MAX_WIDTH};
use crate::foundation::core::{Point, Rect};
use crate::render::config::RenderConfig;

const SPRITE_W: f64 = SPRITE_MAX_WIDTH as f64;
const SPRITE_H: f64 = SPRITE_MAX_HEIGHT as f64;

/// Default ground zone as fractions of the reference height.
const DEFAULT_ZONE_TOP: f64 = 0.55;
const DEFAULT_ZONE_BOTTOM: f64 = 1.0;

/// Vertical band (frame pixels) where anchors may sit without reaching the text box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundZone {
    pub top: f64,
    pub bottom: f64,
}

impl GroundZone {
    pub fn contains_y(self, y: f64) -> bool {
        y >= self.top && y <= self.bottom
    }

    pub fn clamp_y(self, y: f64) -> f64 {
        y.clamp(self.top, self.bottom)
    }
}

/// Bounding box of a sprite anchored at `anchor`.
pub fn sprite_rect(anchor: Point) -> Rect {
    Rect::new(
        anchor.x - SPRITE_W / 2.0,
        anchor.y - SPRITE_H,
        anchor.x + SPRITE_W / 2.0,
        anchor.y,
    )
}

/// True when two boxes overlap on both axes. Touching edges do not count.
pub fn boxes_overlap(a: Rect, b: Rect) -> bool {
    const EPS: f64 = 1e-9;
    let overlap_x = a.x1.min(b.x1) - a.x0.max(b.x0);
    let overlap_y = a.y1.min(b.y1) - a.y0.max(b.y0);
    overlap_x > EPS && overlap_y > EPS
}

/// Position lookup for one location at one output size.
#[derive(Clone, Debug)]
pub struct PositionResolver {
    positions: BTreeMap<String, Point>,
    zone: GroundZone,
    frame_width: f64,
}

impl PositionResolver {
    pub fn new(catalog: &Catalog, location: &str, config: &RenderConfig) -> Self {
        let default_profile;
        let profile = match catalog.location(location) {
            Some(p) => p,
            None => {
                default_profile = LocationProfile::default();
                &default_profile
            }
        };

        let ref_w = f64::from(profile.reference.width.max(1));
        let ref_h = f64::from(profile.reference.height.max(1));
        let sx = f64::from(config.width) / ref_w;
        let sy = f64::from(config.height) / ref_h;

        let positions = profile
            .positions
            .iter()
            .map(|(name, p)| (name.clone(), Point::new(p.x * sx, p.y * sy)))
            .collect();

        let (top, bottom) = match profile.ground_zone {
            Some(z) => (z.top * sy, z.bottom * sy),
            None => (
                ref_h * DEFAULT_ZONE_TOP * sy,
                ref_h * DEFAULT_ZONE_BOTTOM * sy,
            ),
        };
        let bottom = bottom.min(f64::from(config.text_box_y));
        let top = top.min(bottom);

        Self {
            positions,
            zone: GroundZone { top, bottom },
            frame_width: f64::from(config.width),
        }
    }

    pub fn ground_zone(&self) -> GroundZone {
        self.zone
    }

    /// Registered position, scaled to the frame.
    pub fn named(&self, name: &str) -> Option<Point> {
        self.positions.get(name).copied()
    }

    /// Deterministic fallback anchor, always inside the ground zone.
    ///
    /// The first registered position (by name) moved onto the stage, or the bottom center of the
    /// zone for locations without positions.
    pub fn fallback(&self) -> Point {
        match self.positions.values().next() {
            Some(p) => on_stage(*p, self.frame_width, self.zone),
            None => Point::new(self.frame_width / 2.0, self.zone.bottom),
        }
    }

    /// Anchor for `name`, or the fallback.
    pub fn resolve(&self, name: &str) -> Point {
        self.named(name).unwrap_or_else(|| self.fallback())
    }

    /// Anchors for every present character, with overlaps separated.
    ///
    /// Named positions are taken first. Characters without a usable name take the first unused
    /// registered position, then the fallback.
    pub fn resolve_scene(
        &self,
        characters: &[String],
        requested: &BTreeMap<String, String>,
    ) -> BTreeMap<String, Point> {
        let cast: BTreeSet<&str> = characters.iter().map(String::as_str).collect();
        let mut resolved = BTreeMap::<String, Point>::new();
        let mut used = BTreeSet::<&str>::new();

        for &id in &cast {
            let Some(name) = requested.get(id) else {
                continue;
            };
            if let Some((key, p)) = self.positions.get_key_value(name.as_str()) {
                resolved.insert(id.to_string(), *p);
                used.insert(key.as_str());
            } else {
                tracing::debug!(character = id, position = %name, "unknown position name");
            }
        }

        for &id in &cast {
            if resolved.contains_key(id) {
                continue;
            }
            let free = self
                .positions
                .iter()
                .find(|(name, _)| !used.contains(name.as_str()));
            let anchor = match free {
                Some((name, p)) => {
                    used.insert(name.as_str());
                    *p
                }
                None => self.fallback(),
            };
            resolved.insert(id.to_string(), anchor);
        }

        separate(&mut resolved, self.frame_width, self.zone);
        resolved
    }
}

/// Clamp an anchor so the whole sprite box fits the frame width and the anchor sits in the zone.
///
/// On frames narrower than a sprite the anchor is centered horizontally.
pub fn on_stage(p: Point, frame_width: f64, zone: GroundZone) -> Point {
    let half = SPRITE_W / 2.0;
    let x = if frame_width >= SPRITE_W {
        p.x.clamp(half, frame_width - half)
    } else {
        frame_width / 2.0
    };
    Point::new(x, zone.clamp_y(p.y))
}

/// Move anchors apart until no two sprite boxes overlap.
///
/// Every anchor is first moved onto the stage (see [`on_stage`]), so overlap is tested where the
/// sprite is actually drawn. Characters are visited in id order; each one that overlaps an already placed sprite is moved
/// to the abutting candidate with the least displacement. Candidates that keep the sprite inside
/// the frame and the anchor inside the ground zone are preferred. A candidate right of every
/// placed sprite always exists, so the pass never gives up.
pub fn separate(anchors: &mut BTreeMap<String, Point>, frame_width: f64, zone: GroundZone) {
    let mut placed: Vec<Point> = Vec::with_capacity(anchors.len());

    for anchor in anchors.values_mut() {
        let p = on_stage(*anchor, frame_width, zone);
        *anchor = p;
        let clear = |c: Point| {
            placed
                .iter()
                .all(|b| !boxes_overlap(sprite_rect(c), sprite_rect(*b)))
        };
        if clear(p) {
            placed.push(p);
            continue;
        }

        let mut candidates = vec![
            Point::new(SPRITE_W / 2.0, p.y),
            Point::new(frame_width - SPRITE_W / 2.0, p.y),
        ];
        for b in &placed {
            candidates.push(Point::new(b.x - SPRITE_W, p.y));
            candidates.push(Point::new(b.x + SPRITE_W, p.y));
            candidates.push(Point::new(p.x, b.y - SPRITE_H));
            candidates.push(Point::new(p.x, b.y + SPRITE_H));
        }

        let in_bounds = |c: &Point| {
            c.x - SPRITE_W / 2.0 >= 0.0
                && c.x + SPRITE_W / 2.0 <= frame_width
                && zone.contains_y(c.y)
        };
        let mut clear_candidates: Vec<Point> =
            candidates.into_iter().filter(|c| clear(*c)).collect();
        clear_candidates.sort_by(|a, b| {
            in_bounds(b)
                .cmp(&in_bounds(a))
                .then(a.distance(p).total_cmp(&b.distance(p)))
                .then(a.x.total_cmp(&b.x))
                .then(a.y.total_cmp(&b.y))
        });

        let rightmost = placed.iter().map(|b| b.x).fold(f64::NEG_INFINITY, f64::max);
        let chosen = clear_candidates
            .first()
            .copied()
            .unwrap_or(Point::new(rightmost + SPRITE_W, p.y));
        tracing::debug!(from = ?p, to = ?chosen, "separated overlapping sprite");
        *anchor = chosen;
        placed.push(chosen);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/positions.rs"]
mod tests;
