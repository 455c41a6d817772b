use maze_escape::execution::{NullObserver, ScriptedMutations, StepEvent};
use maze_escape::{search, AStar, CellKind, ExecutionStatus, Executor, Grid, Mutation, Position};
use std::ops::ControlFlow;

fn p(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

#[test]
fn three_by_three_example() {
    let mut grid = Grid::new(3);
    grid.set_kind(p(0, 0), CellKind::Start, None).unwrap();
    grid.set_kind(p(2, 2), CellKind::Exit, None).unwrap();
    grid.set_kind(p(0, 1), CellKind::Wall, None).unwrap();
    grid.set_kind(p(1, 1), CellKind::Wall, None).unwrap();

    let (start, exit) = grid.endpoints().unwrap();
    let outcome = search(&grid, start, exit).unwrap();
    let result = outcome.result().expect("path exists");

    assert_eq!(result.path, vec![p(0, 0), p(1, 0), p(2, 0), p(2, 1), p(2, 2)]);
    assert_eq!(result.cost, 4);

    let outcome = Executor::new(AStar::new())
        .execute_path(result.path.clone(), &mut grid, exit)
        .unwrap();
    assert_eq!(outcome.summary(), (true, 4, 4));
}

#[test]
fn corridor_blocked_then_detour_taken() {
    // Two routes around a central block; the wall closes the one in use.
    let mut grid: Grid = "
        S...
        .##.
        .##.
        ...E
    "
    .parse()
    .unwrap();
    let (start, exit) = grid.endpoints().unwrap();
    let plan = search(&grid, start, exit).unwrap().into_result().unwrap();
    assert_eq!(plan.path[1], p(0, 1));

    let mut mutations = ScriptedMutations::new([None, Some(Mutation::new(p(0, 3), CellKind::Wall))]);
    let mut replanned_from = None;
    let mut observer = |_: &Grid, event: &StepEvent<'_>| {
        if let StepEvent::Replanned { from, result } = event {
            assert_eq!(result.path[0], *from);
            replanned_from = Some(*from);
        }
        ControlFlow::Continue(())
    };

    let outcome = Executor::new(AStar::new())
        .execute(plan.path, &mut grid, exit, &mut mutations, &mut observer)
        .unwrap();

    assert_eq!(replanned_from, Some(p(0, 1)));
    assert_eq!(outcome.status, ExecutionStatus::Reached);
    // One step east, back west, then the long way round: 1 + 1 + 6.
    assert_eq!(outcome.summary(), (true, 8, 8));
    assert_eq!(outcome.visited[..2], [p(0, 1), p(0, 0)]);
}

#[test]
fn exit_sealed_mid_walk() {
    let mut grid: Grid = "
        S..
        ...
        ..E
    "
    .parse()
    .unwrap();
    let (start, exit) = grid.endpoints().unwrap();
    let plan = search(&grid, start, exit).unwrap().into_result().unwrap();

    let mut mutations = ScriptedMutations::new([
        Some(Mutation::new(p(1, 2), CellKind::Wall)),
        Some(Mutation::new(p(2, 1), CellKind::Wall)),
    ]);
    let outcome = Executor::new(AStar::new())
        .execute(plan.path, &mut grid, exit, &mut mutations, &mut NullObserver)
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::NoPath);
    assert!(!outcome.reached());
}

#[test]
fn layout_file_round_trip() {
    let path = std::env::temp_dir().join(format!("maze_escape_layout_{}.txt", std::process::id()));
    std::fs::write(&path, "S.L\n#5#\n..E\n").unwrap();

    let grid = Grid::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(grid.kind(p(0, 2)), CellKind::Lock);
    assert_eq!(grid.cost_to_enter(p(1, 1)), 5);
    let result = search(&grid, p(0, 0), p(2, 2)).unwrap().into_result().unwrap();
    assert_eq!(result.path, vec![p(0, 0), p(0, 1), p(1, 1), p(2, 1), p(2, 2)]);
    assert_eq!(result.cost, 8);
}
