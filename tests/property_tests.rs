use dicefall::score::chain_multiplier;
use dicefall::{Die, DieColor, GRID_HEIGHT, GRID_WIDTH, Grid, Piece, ShapeKind, SpecialEffect};
use proptest::prelude::*;

fn arb_shape() -> impl Strategy<Value = ShapeKind> {
    (0..ShapeKind::all().len()).prop_map(|i| ShapeKind::all()[i])
}

fn arb_die() -> impl Strategy<Value = Die> {
    (1u32..=6, 0..7usize, any::<bool>()).prop_map(|(face, color, wild)| {
        let color = DieColor::all()[color];
        if wild {
            Die::wild(color)
        } else {
            Die::new(6, face, color).unwrap()
        }
    })
}

fn arb_cells() -> impl Strategy<Value = Vec<(i32, i32, Die)>> {
    prop::collection::vec(
        (0..GRID_WIDTH as i32, 0..GRID_HEIGHT as i32, arb_die()),
        0..80,
    )
}

fn mono_at(x: i32, y: i32) -> Piece {
    let mut piece = Piece::new(ShapeKind::Mono, |_| Die::wild(DieColor::Red));
    piece.x = x;
    piece.y = y;
    piece
}

proptest! {
    #[test]
    fn prop_four_rotations_restore_occupancy(shape in arb_shape(), column in 0i32..10, row in 0i32..12) {
        let grid = Grid::new();
        let mut piece = Piece::new(shape, |_| Die::wild(DieColor::Green));
        let size = piece.matrix_size() as i32;
        piece.x = column.min(GRID_WIDTH as i32 - size);
        piece.y = row;
        let original = piece.occupancy();
        let x = piece.x;

        for _ in 0..4 {
            prop_assert!(piece.rotate(&grid));
        }
        prop_assert_eq!(piece.occupancy(), original);
        prop_assert_eq!(piece.x, x);
    }

    #[test]
    fn prop_gravity_settles_in_one_pass(cells in arb_cells()) {
        let mut grid = Grid::new();
        for (x, y, die) in cells {
            grid.set_die(x, y, die).unwrap();
        }
        let count = grid.occupied_count();

        grid.apply_gravity();
        prop_assert_eq!(grid.apply_gravity(), 0);
        prop_assert_eq!(grid.occupied_count(), count);

        // No die rests above an empty cell
        for (pos, _) in grid.iter() {
            if pos.y + 1 < GRID_HEIGHT as i32 {
                prop_assert!(grid.get(pos.x, pos.y + 1).is_some());
            }
        }
    }

    #[test]
    fn prop_collision_matches_bounds(x in -5i32..15, y in -5i32..25) {
        let grid = Grid::new();
        let piece = mono_at(x, y);
        let outside = x < 0 || x >= GRID_WIDTH as i32 || y >= GRID_HEIGHT as i32;
        prop_assert_eq!(grid.check_collision(&piece, x, y), outside);
    }

    #[test]
    fn prop_empty_cycle(x in 0i32..10, y in 0i32..20, die in arb_die()) {
        let mut grid = Grid::new();
        prop_assert!(grid.is_empty(x, y).unwrap());
        grid.set_die(x, y, die.clone()).unwrap();
        prop_assert!(!grid.is_empty(x, y).unwrap());
        prop_assert_eq!(grid.take_die(x, y).unwrap(), Some(die));
        prop_assert!(grid.is_empty(x, y).unwrap());
    }

    #[test]
    fn prop_effect_tiers_never_shrink(a in 0usize..40, b in 0usize..40) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(SpecialEffect::for_size(small) <= SpecialEffect::for_size(large));
    }

    #[test]
    fn prop_chain_multiplier_is_floor_log2(k in 0u32..31) {
        prop_assert_eq!(chain_multiplier(1 << k), k);
        if k > 1 {
            prop_assert_eq!(chain_multiplier((1 << k) - 1), k - 1);
        }
    }
}
