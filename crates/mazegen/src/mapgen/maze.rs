//! Lattice maze carver with dead-end recovery and loop injection.
//!
//! Maze nodes share the parity of the carve origin and sit two cells apart;
//! the cell between two connected nodes is carved along with the target.

use crate::types::Direction;

use super::grid::{PreLevel, PreTile};
use super::seed::{RandomSource, pick_index};

/// Neighbour order for both the carve step and the recovery scan.
const NEIGHBOR_ORDER: [Direction; 4] =
    [Direction::North, Direction::South, Direction::West, Direction::East];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CarveSummary {
    /// Corridor extensions made from the walking cursor.
    pub steps: usize,
    /// Dead ends resolved by reattaching an uncarved node to the maze.
    pub reconnections: usize,
}

fn node_two_away(
    level: &PreLevel,
    row: usize,
    col: usize,
    dir: Direction,
) -> Option<(usize, usize)> {
    let (dy, dx) = dir.delta();
    let row = row.checked_add_signed(2 * dy as isize)?;
    let col = col.checked_add_signed(2 * dx as isize)?;
    (row < level.rows() && col < level.cols()).then_some((row, col))
}

fn between(row: usize, col: usize, dir: Direction) -> (usize, usize) {
    let (dy, dx) = dir.delta();
    (row.wrapping_add_signed(dy as isize), col.wrapping_add_signed(dx as isize))
}

/// Picks uniformly among directions whose node two cells away is still
/// carve-eligible. Draws nothing when there is no such direction.
pub fn open_direction(
    level: &PreLevel,
    row: usize,
    col: usize,
    rng: &mut impl RandomSource,
) -> Option<Direction> {
    let open: Vec<Direction> = NEIGHBOR_ORDER
        .into_iter()
        .filter(|&dir| {
            node_two_away(level, row, col, dir).is_some_and(|(r, c)| level.is(r, c, PreTile::Wall))
        })
        .collect();
    if open.is_empty() {
        return None;
    }
    Some(open[pick_index(rng, open.len())])
}

/// First direction, in neighbour order, whose node two cells away is carved.
pub fn populated_neighbor(level: &PreLevel, row: usize, col: usize) -> Option<Direction> {
    NEIGHBOR_ORDER.into_iter().find(|&dir| {
        node_two_away(level, row, col, dir).is_some_and(|(r, c)| level.is(r, c, PreTile::MazeFloor))
    })
}

/// Lattice nodes sharing the origin's parity in row-major order, starting at
/// `origin` and wrapping around to the top-left node.
fn lattice_from(
    rows: usize,
    cols: usize,
    origin: (usize, usize),
) -> impl Iterator<Item = (usize, usize)> {
    let node_rows: Vec<usize> = (origin.0 % 2..rows).step_by(2).collect();
    let node_cols: Vec<usize> = (origin.1 % 2..cols).step_by(2).collect();
    let row_at = node_rows.iter().position(|&row| row == origin.0).unwrap_or(0);
    let col_at = node_cols.iter().position(|&col| col == origin.1).unwrap_or(0);
    let width = node_cols.len();
    let total = node_rows.len() * width;
    let start = row_at * width + col_at;
    (0..total).map(move |step| {
        let idx = (start + step) % total;
        (node_rows[idx / width], node_cols[idx % width])
    })
}

/// Carves a spanning-tree maze over every reachable `Wall` node.
///
/// An origin that is not `Wall` (inside a reserved room, say) is left as is;
/// the carve then starts from the next `Wall` node in scan order.
pub fn carve_maze(
    level: &mut PreLevel,
    origin: (usize, usize),
    rng: &mut impl RandomSource,
) -> CarveSummary {
    let mut summary = CarveSummary::default();
    let start = lattice_from(level.rows(), level.cols(), origin)
        .find(|&(row, col)| level.is(row, col, PreTile::Wall));
    let Some((mut row, mut col)) = start else {
        return summary;
    };
    level.set(row, col, PreTile::MazeFloor);

    loop {
        if let Some(dir) = open_direction(level, row, col, rng) {
            let (mid_row, mid_col) = between(row, col, dir);
            level.set(mid_row, mid_col, PreTile::MazeFloor);
            if let Some((next_row, next_col)) = node_two_away(level, row, col, dir) {
                level.set(next_row, next_col, PreTile::MazeFloor);
                (row, col) = (next_row, next_col);
            }
            summary.steps += 1;
            continue;
        }

        match reattach_uncarved_node(level, origin) {
            Some(node) => {
                (row, col) = node;
                summary.reconnections += 1;
            }
            None => return summary,
        }
    }
}

/// Wrapping row-major scan from the origin for the first `Wall` node next to
/// the carved maze. The node and its connecting cell are carved in place.
fn reattach_uncarved_node(level: &mut PreLevel, origin: (usize, usize)) -> Option<(usize, usize)> {
    for (row, col) in lattice_from(level.rows(), level.cols(), origin) {
        if !level.is(row, col, PreTile::Wall) {
            continue;
        }
        if let Some(dir) = populated_neighbor(level, row, col) {
            level.set(row, col, PreTile::MazeFloor);
            let (mid_row, mid_col) = between(row, col, dir);
            level.set(mid_row, mid_col, PreTile::MazeFloor);
            return Some((row, col));
        }
    }
    None
}

/// Makes `attempts` random tries at opening a wall that splits two corridors.
/// Returns how many walls were opened.
pub fn inject_loops(level: &mut PreLevel, attempts: usize, rng: &mut impl RandomSource) -> usize {
    let mut opened = 0;
    for _ in 0..attempts {
        let row = pick_index(rng, level.rows() - 2) + 1;
        let col = pick_index(rng, level.cols() - 2) + 1;
        if level.is(row, col, PreTile::Wall) && splits_corridors(level, row, col) {
            level.set(row, col, PreTile::Floor);
            opened += 1;
        }
    }
    opened
}

fn splits_corridors(level: &PreLevel, row: usize, col: usize) -> bool {
    let carved = |r: usize, c: usize| level.is(r, c, PreTile::MazeFloor);
    (carved(row - 1, col) && carved(row + 1, col)) || (carved(row, col - 1) && carved(row, col + 1))
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use proptest::prelude::*;

    use super::*;
    use crate::mapgen::seed::{MapRng, ScriptedRng};

    fn carved_cells(level: &PreLevel) -> Vec<(usize, usize)> {
        (0..level.rows())
            .flat_map(|row| (0..level.cols()).map(move |col| (row, col)))
            .filter(|&(row, col)| level.is(row, col, PreTile::MazeFloor))
            .collect()
    }

    fn uncarved_nodes(level: &PreLevel) -> Vec<(usize, usize)> {
        (1..level.rows() - 1)
            .step_by(2)
            .flat_map(|row| (1..level.cols() - 1).step_by(2).map(move |col| (row, col)))
            .filter(|&(row, col)| !level.is(row, col, PreTile::MazeFloor))
            .collect()
    }

    fn carved_cells_connected(level: &PreLevel) -> bool {
        let cells = carved_cells(level);
        let Some(start) = cells.first().copied() else {
            return true;
        };
        let mut open = VecDeque::from([start]);
        let mut seen = BTreeSet::from([start]);
        while let Some((row, col)) = open.pop_front() {
            for next in [(row - 1, col), (row + 1, col), (row, col - 1), (row, col + 1)] {
                if level.is(next.0, next.1, PreTile::MazeFloor) && seen.insert(next) {
                    open.push_back(next);
                }
            }
        }
        seen.len() == cells.len()
    }

    #[test]
    fn open_direction_checks_north_south_west_east() {
        let level = PreLevel::new(7, 7);
        let expected = [Direction::North, Direction::South, Direction::West, Direction::East];
        for (draw, dir) in expected.into_iter().enumerate() {
            let mut rng = ScriptedRng::new(vec![draw as u32]);
            assert_eq!(open_direction(&level, 3, 3, &mut rng), Some(dir));
        }

        let mut rng = ScriptedRng::new(vec![1]);
        assert_eq!(open_direction(&level, 1, 1, &mut rng), Some(Direction::East));
    }

    #[test]
    fn open_direction_without_candidates_draws_nothing() {
        let mut level = PreLevel::new(7, 7);
        for (row, col) in [(1, 3), (5, 3), (3, 1), (3, 5)] {
            level.set(row, col, PreTile::MazeFloor);
        }
        let mut rng = ScriptedRng::new(vec![0]);
        assert_eq!(open_direction(&level, 3, 3, &mut rng), None);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn populated_neighbor_prefers_direction_order() {
        let mut level = PreLevel::new(9, 9);
        level.set(3, 1, PreTile::MazeFloor);
        level.set(5, 3, PreTile::MazeFloor);
        assert_eq!(populated_neighbor(&level, 3, 3), Some(Direction::South));
        assert_eq!(populated_neighbor(&level, 5, 5), Some(Direction::West));
        assert_eq!(populated_neighbor(&level, 7, 7), None);
    }

    #[test]
    fn carved_maze_is_a_spanning_tree_over_the_node_lattice() {
        let mut level = PreLevel::new(21, 21);
        let summary = carve_maze(&mut level, (1, 1), &mut MapRng::seeded(3));

        let nodes = 10 * 10;
        assert_eq!(level.count(PreTile::MazeFloor), 2 * nodes - 1);
        assert_eq!(summary.steps + summary.reconnections, nodes - 1);
        assert!(carved_cells_connected(&level));
        for row in (2..20).step_by(2) {
            for col in (2..20).step_by(2) {
                assert!(level.is(row, col, PreTile::Wall), "pillar ({row}, {col}) was carved");
            }
        }
    }

    #[test]
    fn carving_routes_around_reserved_rooms() {
        let mut level = PreLevel::new(21, 21);
        level.fill(6..13, 6..13, PreTile::HardFloor);
        carve_maze(&mut level, (1, 1), &mut MapRng::seeded(11));

        assert_eq!(level.count(PreTile::HardFloor), 49);
        assert!(carved_cells_connected(&level));
        assert!(level.is(5, 5, PreTile::MazeFloor));
        assert!(level.is(13, 13, PreTile::MazeFloor));
    }

    #[test]
    fn inner_origin_wraps_the_recovery_scan_over_the_whole_lattice() {
        for seed in 0..20 {
            let mut level = PreLevel::new(21, 21);
            carve_maze(&mut level, (3, 3), &mut MapRng::seeded(seed));
            assert_eq!(uncarved_nodes(&level), Vec::new(), "seed {seed} left nodes behind");
            assert_eq!(level.count(PreTile::MazeFloor), 2 * 100 - 1);
            assert!(carved_cells_connected(&level));
        }
    }

    #[test]
    fn origin_inside_a_reserved_room_is_not_overwritten() {
        let mut level = PreLevel::new(21, 21);
        level.fill(1..4, 1..4, PreTile::HardFloor);
        carve_maze(&mut level, (1, 1), &mut MapRng::seeded(2));

        assert_eq!(level.count(PreTile::HardFloor), 9);
        assert!(level.is(1, 1, PreTile::HardFloor));
        let inside = [(1, 1), (1, 3), (3, 1), (3, 3)];
        assert_eq!(uncarved_nodes(&level), inside.to_vec());
        assert_eq!(level.count(PreTile::MazeFloor), 2 * 96 - 1);
        assert!(carved_cells_connected(&level));
    }

    #[test]
    fn lattice_scan_wraps_back_to_the_top_left_node() {
        let nodes: Vec<(usize, usize)> = lattice_from(7, 7, (3, 5)).collect();
        assert_eq!(nodes.len(), 9);
        assert_eq!(&nodes[..3], &[(3, 5), (5, 1), (5, 3)]);
        assert_eq!(nodes[4], (1, 1));
        assert_eq!(nodes[8], (3, 3));
    }

    #[test]
    fn loop_injection_consumes_two_draws_per_attempt() {
        let mut level = PreLevel::new(15, 15);
        let mut rng = ScriptedRng::new(vec![0, 4, 7, 2, 9]);
        assert_eq!(inject_loops(&mut level, 150, &mut rng), 0);
        assert_eq!(rng.draws(), 300);
        assert_eq!(level.count(PreTile::Floor), 0);
    }

    #[test]
    fn loop_injection_opens_walls_between_parallel_corridors() {
        let mut level = PreLevel::new(7, 7);
        level.fill(1..2, 1..6, PreTile::MazeFloor);
        level.fill(3..4, 1..6, PreTile::MazeFloor);
        // Draws map to row 2, col 2.
        let mut rng = ScriptedRng::new(vec![1, 1]);
        assert_eq!(inject_loops(&mut level, 1, &mut rng), 1);
        assert!(level.is(2, 2, PreTile::Floor));

        // A wall touching one corridor only stays put.
        let mut rng = ScriptedRng::new(vec![3, 3]);
        assert_eq!(inject_loops(&mut level, 1, &mut rng), 0);
        assert!(level.is(4, 4, PreTile::Wall));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn carved_mazes_stay_connected_on_any_grid(
            seed in any::<u32>(),
            rows in 7_usize..40,
            cols in 7_usize..40,
            origin_row in 0_usize..20,
            origin_col in 0_usize..20
        ) {
            let node_rows = (rows - 1) / 2;
            let node_cols = (cols - 1) / 2;
            let origin = (1 + 2 * (origin_row % node_rows), 1 + 2 * (origin_col % node_cols));
            let mut level = PreLevel::new(rows, cols);
            let mut rng = MapRng::seeded(seed);
            carve_maze(&mut level, origin, &mut rng);

            prop_assert_eq!(level.count(PreTile::MazeFloor), 2 * node_rows * node_cols - 1);
            prop_assert!(uncarved_nodes(&level).is_empty(), "origin {:?}", origin);
            prop_assert!(carved_cells_connected(&level));

            inject_loops(&mut level, 150, &mut rng);
            for (row, col) in carved_cells(&level) {
                prop_assert!(row % 2 == 1 || col % 2 == 1, "({}, {}) breaks the lattice", row, col);
            }
        }
    }
}
