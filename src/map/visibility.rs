use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{DistanceAlg, field_of_view};

use super::Map;

/// Tiles visible from `origin` within `radius`, walls at the edge included.
///
/// Out-of-bounds points and anything past the radius are dropped even if the
/// shadowcaster reports them. A see-through tile only counts when it can see
/// `origin` back, so sight between two open tiles always runs both ways.
pub fn compute_visible(map: &Map, origin: Point, radius: i32) -> HashSet<Point> {
    let seen = shadowcast(map, origin, radius);
    seen.iter()
        .copied()
        .filter(|point| {
            *point == origin
                || map.blocks_sight(*point)
                || shadowcast(map, *point, radius).contains(&origin)
        })
        .collect()
}

fn shadowcast(map: &Map, origin: Point, radius: i32) -> HashSet<Point> {
    if !map.in_bounds(origin) {
        return HashSet::new();
    }
    let limit = radius.max(0) as f32;
    field_of_view(origin, radius.max(0), map)
        .into_iter()
        .filter(|point| map.in_bounds(*point))
        .filter(|point| DistanceAlg::Pythagoras.distance2d(origin, *point) <= limit)
        .collect()
}

/// Recomputes the visible set and marks every visible tile explored.
/// Explored tiles never revert.
pub fn recompute(map: &mut Map, origin: Point, radius: i32) -> HashSet<Point> {
    let visible = compute_visible(map, origin, radius);
    for point in &visible {
        map.reveal_point(*point);
    }
    visible
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bracket_random::prelude::RandomNumberGenerator;
    use proptest::prelude::*;

    use super::*;
    use crate::{
        config::DungeonParams,
        map::{Room, Tile, generator::generate},
    };

    fn open_room() -> Map {
        let mut map = Map::new(30, 30);
        map.carve_room(&Room::with_size(0, 0, 29, 29));
        map
    }

    #[test]
    fn origin_is_always_visible() {
        let map = open_room();
        let visible = compute_visible(&map, Point::new(10, 10), 5);
        assert!(visible.contains(&Point::new(10, 10)));
    }

    #[test]
    fn radius_bounds_the_visible_set() {
        let map = open_room();
        let origin = Point::new(14, 14);
        let visible = compute_visible(&map, origin, 4);
        assert!(visible.contains(&Point::new(18, 14)));
        assert!(!visible.contains(&Point::new(19, 14)));
        for point in &visible {
            assert!(DistanceAlg::Pythagoras.distance2d(origin, *point) <= 4.0);
        }
    }

    #[test]
    fn walls_hide_what_lies_behind_them() {
        let mut map = Map::new(20, 5);
        map.carve_h_tunnel(1, 18, 2);
        map.set_tile(Point::new(8, 2), Tile::wall());
        let visible = compute_visible(&map, Point::new(3, 2), 10);
        assert!(visible.contains(&Point::new(8, 2)));
        assert!(!visible.contains(&Point::new(10, 2)));
    }

    #[test]
    fn explored_survives_leaving_sight() {
        let mut map = open_room();
        recompute(&mut map, Point::new(5, 5), 3);
        assert!(map.is_explored(Point::new(6, 5)));
        let visible = recompute(&mut map, Point::new(25, 25), 3);
        assert!(!visible.contains(&Point::new(6, 5)));
        assert!(map.is_explored(Point::new(6, 5)));
    }

    #[test]
    fn out_of_bounds_origin_sees_nothing() {
        let map = open_room();
        assert!(compute_visible(&map, Point::new(-3, 4), 5).is_empty());
    }

    #[test]
    fn sight_between_open_tiles_runs_both_ways() {
        let mut map = Map::new(14, 14);
        map.carve_room(&Room::with_size(0, 0, 13, 13));
        for pillar in [(4, 4), (5, 8), (9, 5), (8, 9), (6, 6)] {
            map.set_tile(Point::new(pillar.0, pillar.1), Tile::wall());
        }
        let floor = map.walkable_points();
        let sight: HashMap<Point, HashSet<Point>> = floor
            .iter()
            .map(|point| (*point, compute_visible(&map, *point, 6)))
            .collect();
        for a in &floor {
            for b in &floor {
                assert_eq!(
                    sight[a].contains(b),
                    sight[b].contains(a),
                    "{a:?} and {b:?} disagree"
                );
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(6))]

        #[test]
        fn generated_levels_have_mutual_sight(seed in any::<u64>(), pick in any::<usize>()) {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let level = generate(&mut rng, &DungeonParams::default(), 1).expect("level");
            let floor = level.map.walkable_points();
            let origin = floor[pick % floor.len()];
            let visible = compute_visible(&level.map, origin, 6);
            let nearby = floor
                .iter()
                .filter(|point| DistanceAlg::Pythagoras.distance2d(origin, **point) <= 6.0)
                .step_by(3);
            for other in nearby {
                let back = compute_visible(&level.map, *other, 6);
                prop_assert_eq!(visible.contains(other), back.contains(&origin));
            }
        }
    }
}
