use log::info;
use twophase::{
    CubieCube, FaceletError, InvalidCubeError, Move, MoveSequence, Search, SearchOptions,
    SolutionFormat, SolveError, Tables,
    facelet::{SOLVED_FACELETS, from_scramble},
    moves::{Face, random_scramble},
    solve,
};

const SCRAMBLES: [&str; 4] = [
    "U2 R2 L D2 L F2 B2 U' D' F U R' L2 U2 D L F' B2 D R2",
    "L U' R2 F B2 R2 L U' D2 R2 F B' U R' U2 R2 D2 F2 U2 L'",
    "R2 D' B2 U' D' R2 U' L2 U' L2 B' R' F D F' B U2 L'",
    "R U R' U' R' F R2 U' R' U' R U R' F'",
];

fn scrambled(scramble: &MoveSequence) -> CubieCube {
    CubieCube::SOLVED.apply_moves(scramble)
}

fn assert_solves(scramble: &MoveSequence, solution: &MoveSequence) {
    assert_eq!(
        scrambled(scramble).apply_moves(solution),
        CubieCube::SOLVED,
        "{solution} does not solve {scramble}"
    );
}

#[test_log::test]
fn test_solved_cube() {
    let solution = solve(SOLVED_FACELETS, &SearchOptions::default()).unwrap();
    assert!(solution.is_empty());
    assert_eq!(solution.to_string(), "");
}

#[test_log::test]
fn test_single_moves() {
    for face in Face::ALL {
        for turns in 1..=3 {
            let mv = Move::new(face, turns);
            let scramble = MoveSequence::from(vec![mv]);
            let solution = solve(&from_scramble(&scramble), &SearchOptions::default()).unwrap();
            assert_eq!(solution.moves().as_slice(), [mv.inverse()], "{mv}");
        }
    }
}

#[test_log::test]
fn test_three_move_scramble() {
    let scramble = "F U R".parse().unwrap();
    let solution = solve(&from_scramble(&scramble), &SearchOptions::default()).unwrap();
    assert!(solution.len() <= 3);
    assert_solves(&scramble, solution.moves());
}

#[test_log::test]
fn test_known_scrambles() {
    for scramble in SCRAMBLES {
        let scramble = scramble.parse().unwrap();
        let solution = solve(&from_scramble(&scramble), &SearchOptions::default()).unwrap();
        info!("{scramble} solved by {solution}");
        assert!(solution.len() <= 21);
        assert_solves(&scramble, solution.moves());
    }
}

#[test_log::test]
fn test_random_scrambles() {
    let mut rng = fastrand::Rng::with_seed(2024);
    let mut search = Search::new(Tables::get(), &SearchOptions::default());
    for _ in 0..20 {
        let scramble = random_scramble(rng.usize(25..40), &mut rng);
        let solution = search.solve_cube(&scrambled(&scramble)).unwrap();
        assert!(solution.len() <= 21, "{solution} is too long");
        assert_solves(&scramble, solution.moves());
    }
}

#[test_log::test]
fn test_random_states() {
    let mut rng = fastrand::Rng::with_seed(99);
    let mut search = Search::new(Tables::get(), &SearchOptions::default());
    for _ in 0..20 {
        let cube = CubieCube::random(&mut rng);
        let solution = search.solve_cube(&cube).unwrap();
        assert!(solution.len() <= 21);
        assert_eq!(cube.apply_moves(solution.moves()), CubieCube::SOLVED);
    }
}

#[test_log::test]
fn test_more_probes_never_longer() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..5 {
        let cube = scrambled(&random_scramble(30, &mut rng));
        let quick = Search::new(Tables::get(), &SearchOptions::default())
            .solve_cube(&cube)
            .unwrap();
        let thorough = Search::new(
            Tables::get(),
            &SearchOptions {
                min_probes: 2000,
                ..SearchOptions::default()
            },
        )
        .solve_cube(&cube)
        .unwrap();
        assert!(thorough.len() <= quick.len());
        assert_eq!(cube.apply_moves(thorough.moves()), CubieCube::SOLVED);
    }
}

#[test_log::test]
fn test_restricted_frames() {
    let scramble = SCRAMBLES[0].parse().unwrap();
    for (try_inverse, try_all_axes) in [(false, true), (true, false), (false, false)] {
        let options = SearchOptions {
            try_inverse,
            try_all_axes,
            ..SearchOptions::default()
        };
        let solution = solve(&from_scramble(&scramble), &options).unwrap();
        assert!(solution.len() <= 21);
        assert_solves(&scramble, solution.moves());
    }
}

#[test_log::test]
fn test_inverse_format() {
    let scramble = SCRAMBLES[1].parse().unwrap();
    let options = SearchOptions {
        format: SolutionFormat::INVERSE,
        ..SearchOptions::default()
    };
    let generator = solve(&from_scramble(&scramble), &options).unwrap();
    assert_eq!(
        CubieCube::SOLVED.apply_moves(generator.moves()),
        scrambled(&scramble)
    );
}

#[test_log::test]
fn test_separator_and_length_format() {
    let scramble = SCRAMBLES[2].parse().unwrap();
    let options = SearchOptions {
        format: SolutionFormat::SEPARATOR | SolutionFormat::APPEND_LENGTH,
        ..SearchOptions::default()
    };
    let solution = solve(&from_scramble(&scramble), &options).unwrap();
    let printed = solution.to_string();
    assert!(printed.ends_with(&format!("({}f)", solution.len())));

    // Dropping the markers leaves exactly the moves
    let moves = printed
        .split_whitespace()
        .filter(|token| *token != "." && !token.ends_with("f)"))
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(moves, solution.moves().to_string());
    assert!(printed.matches('.').count() <= 1);
}

#[test_log::test]
fn test_depth_limit() {
    let scramble = "F U R".parse().unwrap();
    let options = SearchOptions {
        max_depth: 2,
        ..SearchOptions::default()
    };
    assert_eq!(
        solve(&from_scramble(&scramble), &options),
        Err(SolveError::NoSolution { max_depth: 2 })
    );
}

#[test_log::test]
fn test_probe_limit() {
    let scramble = SCRAMBLES[0].parse().unwrap();
    let options = SearchOptions {
        max_probes: 0,
        ..SearchOptions::default()
    };
    assert_eq!(
        solve(&from_scramble(&scramble), &options),
        Err(SolveError::ProbeLimit { max_probes: 0 })
    );
}

#[test_log::test]
fn test_malformed_facelets() {
    assert_eq!(
        solve("UUU", &SearchOptions::default()),
        Err(SolveError::Facelet(FaceletError::WrongLength(3)))
    );

    let mut unknown = SOLVED_FACELETS.to_owned();
    unknown.replace_range(7..8, "?");
    assert_eq!(
        solve(&unknown, &SearchOptions::default()),
        Err(SolveError::Facelet(FaceletError::UnknownSymbol('?')))
    );

    // Ten R stickers and eight U stickers
    let mut recolored = SOLVED_FACELETS.to_owned();
    recolored.replace_range(0..1, "R");
    assert_eq!(recolored.len(), 54);
    assert_eq!(
        solve(&recolored, &SearchOptions::default()),
        Err(SolveError::Facelet(FaceletError::WrongSymbolCount {
            symbol: 'U',
            count: 8
        }))
    );
}

#[test_log::test]
fn test_unsolvable_cube() {
    // Two edges swapped in place
    let mut swapped = CubieCube::SOLVED.to_facelets().into_bytes();
    swapped.swap(5, 7);
    swapped.swap(10, 19);
    let swapped = String::from_utf8(swapped).unwrap();
    assert_eq!(
        solve(&swapped, &SearchOptions::default()),
        Err(SolveError::InvalidCube(InvalidCubeError::PermutationParity))
    );
}
