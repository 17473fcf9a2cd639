//! Static level regions
//!
//! The "other" object group is classified once at load time into a start
//! point, exactly one goal, and any number of damaging and blocking zones.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::map::{LevelError, MapObject};
use crate::rotate_about;

/// A rectangle rotated around its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
    /// Degrees, clockwise
    pub rotation: f32,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2, rotation: f32) -> Self {
        Self {
            pos,
            size,
            rotation,
        }
    }

    /// Axis-aligned rectangle centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size / 2.0, size, 0.0)
    }

    /// Axis-aligned bounds (min, max) of the rotated rectangle
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let corners = [
            self.pos,
            self.pos + Vec2::new(self.size.x, 0.0),
            self.pos + Vec2::new(0.0, self.size.y),
            self.pos + self.size,
        ]
        .map(|c| rotate_about(c, self.pos, self.rotation));

        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        (min, max)
    }

    /// Bounding-box overlap test (touching edges do not overlap)
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }

    pub fn center(&self) -> Vec2 {
        let (min, max) = self.bounds();
        (min + max) / 2.0
    }
}

/// Behavioral role of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Spawn point of the crystal
    Start,
    /// Reaching it finishes the level
    Goal,
    /// Any contact inside is a severe hit
    Damaging,
    /// Vertical beam is unavailable inside
    Blocking,
}

impl ZoneKind {
    /// Parse the object type used by the level editor
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "start" => Some(ZoneKind::Start),
            "end" => Some(ZoneKind::Goal),
            "damaging" => Some(ZoneKind::Damaging),
            "blocking" => Some(ZoneKind::Blocking),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Start => "start",
            ZoneKind::Goal => "end",
            ZoneKind::Damaging => "damaging",
            ZoneKind::Blocking => "blocking",
        }
    }
}

/// A classified region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub kind: ZoneKind,
    pub rect: Rect,
}

/// All regions of one level
#[derive(Debug, Clone)]
pub struct ZoneSet {
    start: Vec2,
    goal: Zone,
    damaging: Vec<Zone>,
    blocking: Vec<Zone>,
}

impl ZoneSet {
    /// Classify the "other" object group. Exactly one start and one goal.
    pub fn from_objects(objects: &[MapObject]) -> Result<Self, LevelError> {
        let mut start = None;
        let mut goal = None;
        let mut damaging = Vec::new();
        let mut blocking = Vec::new();

        for obj in objects {
            let kind =
                ZoneKind::parse(&obj.kind).ok_or_else(|| LevelError::UnknownRegion(obj.kind.clone()))?;
            let zone = Zone {
                kind,
                rect: obj.rect(),
            };
            match kind {
                ZoneKind::Start => {
                    if start.replace(zone.rect.pos).is_some() {
                        return Err(LevelError::DuplicateRegion(kind.as_str()));
                    }
                }
                ZoneKind::Goal => {
                    if goal.replace(zone).is_some() {
                        return Err(LevelError::DuplicateRegion(kind.as_str()));
                    }
                }
                ZoneKind::Damaging => damaging.push(zone),
                ZoneKind::Blocking => blocking.push(zone),
            }
        }

        Ok(Self {
            start: start.ok_or(LevelError::MissingRegion(ZoneKind::Start.as_str()))?,
            goal: goal.ok_or(LevelError::MissingRegion(ZoneKind::Goal.as_str()))?,
            damaging,
            blocking,
        })
    }

    /// Spawn position of the crystal
    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn goal(&self) -> &Zone {
        &self.goal
    }

    pub fn damaging(&self) -> &[Zone] {
        &self.damaging
    }

    pub fn blocking(&self) -> &[Zone] {
        &self.blocking
    }

    pub fn overlaps_damaging(&self, region: &Rect) -> bool {
        self.damaging.iter().any(|z| z.rect.overlaps(region))
    }

    pub fn overlaps_blocking(&self, region: &Rect) -> bool {
        self.blocking.iter().any(|z| z.rect.overlaps(region))
    }

    pub fn overlaps_goal(&self, region: &Rect) -> bool {
        self.goal.rect.overlaps(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(kind: &str, x: f32, y: f32, w: f32, h: f32) -> MapObject {
        MapObject {
            kind: kind.to_string(),
            x,
            y,
            width: w,
            height: h,
            rotation: 0.0,
        }
    }

    #[test]
    fn test_classify_regions() {
        let zones = ZoneSet::from_objects(&[
            obj("start", 10.0, 20.0, 16.0, 16.0),
            obj("end", 300.0, 20.0, 32.0, 32.0),
            obj("damaging", 100.0, 100.0, 50.0, 10.0),
            obj("damaging", 200.0, 100.0, 50.0, 10.0),
            obj("blocking", 0.0, 0.0, 10.0, 10.0),
        ])
        .unwrap();
        assert_eq!(zones.start(), Vec2::new(10.0, 20.0));
        assert_eq!(zones.goal().kind, ZoneKind::Goal);
        assert_eq!(zones.damaging().len(), 2);
        assert_eq!(zones.blocking().len(), 1);
    }

    #[test]
    fn test_missing_goal_is_fatal() {
        let err = ZoneSet::from_objects(&[obj("start", 0.0, 0.0, 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, LevelError::MissingRegion("end")));
    }

    #[test]
    fn test_duplicate_start_is_fatal() {
        let err = ZoneSet::from_objects(&[
            obj("start", 0.0, 0.0, 1.0, 1.0),
            obj("start", 5.0, 0.0, 1.0, 1.0),
            obj("end", 9.0, 0.0, 1.0, 1.0),
        ])
        .unwrap_err();
        assert!(matches!(err, LevelError::DuplicateRegion("start")));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let err = ZoneSet::from_objects(&[obj("lava", 0.0, 0.0, 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, LevelError::UnknownRegion(ref s) if s == "lava"));
    }

    #[test]
    fn test_overlap_uses_rotated_bounds() {
        // 40x4 bar rotated 90° hangs down from (100, 0) into x ∈ [96, 100]
        let bar = Rect::new(Vec2::new(100.0, 0.0), Vec2::new(40.0, 4.0), 90.0);
        let spot = Rect::centered(Vec2::new(98.0, 30.0), Vec2::new(2.0, 2.0));
        assert!(bar.overlaps(&spot));
        let unrotated = Rect::new(Vec2::new(100.0, 0.0), Vec2::new(40.0, 4.0), 0.0);
        assert!(!unrotated.overlaps(&spot));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(Vec2::ZERO, Vec2::splat(10.0), 0.0);
        let b = Rect::new(Vec2::new(10.0, 0.0), Vec2::splat(10.0), 0.0);
        assert!(!a.overlaps(&b));
    }
}
