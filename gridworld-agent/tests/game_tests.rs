use gridworld_agent::game::{GameConfig, Level, Platformer, DEFAULT_LEVEL};
use gridworld_agent::{AgentError, Key};

fn game(level: &str) -> Platformer {
    Platformer::new(GameConfig {
        level: level.to_string(),
        ..GameConfig::default()
    })
    .unwrap()
}

#[test]
fn test_default_level_parses() {
    let level = Level::parse(DEFAULT_LEVEL).unwrap();
    assert_eq!((level.width, level.height), (20, 8));
    assert_eq!(level.start, (2, 5));
    assert_eq!(level.goal, (14, 2));
}

#[test]
fn test_level_errors() {
    assert!(matches!(Level::parse("...\n#G#"), Err(AgentError::Level { .. })), "no start");
    assert!(matches!(Level::parse("C.G\n##"), Err(AgentError::Level { line: 2, .. })));
    assert!(Level::parse("C?G").is_err());
    assert!(Level::parse("CCG").is_err());
    assert!(Level::parse("").is_err());
}

#[test]
fn test_walk_one_cell_per_interval() {
    let mut g = game(DEFAULT_LEVEL);
    g.press(Key::Right);
    g.tick(100.0);
    assert_eq!(g.position(), (3, 5));
    g.tick(250.0);
    assert_eq!(g.position(), (5, 5));
    g.tick(50.0);
    assert_eq!(g.position(), (6, 5), "leftover time carries over");

    g.release(Key::Right);
    g.tick(500.0);
    assert_eq!(g.position(), (6, 5));
}

#[test]
fn test_walls_block() {
    let mut g = game("....\nC#G.\n####");
    g.press(Key::Right);
    g.tick(1000.0);
    assert_eq!(g.position(), (0, 1));
    g.release(Key::Right);
    g.press(Key::Left);
    g.tick(1000.0);
    assert_eq!(g.position(), (0, 1), "the grid edge is a wall");
}

#[test]
fn test_jump_rises_then_falls() {
    let mut g = game(DEFAULT_LEVEL);
    g.press(Key::Space);
    g.tick(300.0);
    assert_eq!(g.position(), (2, 2), "three cells up");
    g.release(Key::Space);
    g.tick(300.0);
    assert_eq!(g.position(), (2, 5), "back on the ground");
    g.tick(300.0);
    assert_eq!(g.position(), (2, 5));
}

#[test]
fn test_no_jump_in_mid_air() {
    let mut g = game("...\n...\n...\nC.G\n...\n###");
    // Standing over a gap: falls first, jumps only once grounded
    g.press(Key::Space);
    g.tick(100.0);
    assert_eq!(g.position(), (0, 4));
}

#[test]
fn test_reach_goal() {
    let mut g = game("C.G\n###");
    assert!(!g.reached_goal());
    g.press(Key::Right);
    g.tick(200.0);
    assert!(g.reached_goal());
    let pos = g.position();
    g.tick(1000.0);
    assert_eq!(g.position(), pos, "the game freezes once won");
}

#[test]
fn test_escape_restarts() {
    let mut g = game(DEFAULT_LEVEL);
    g.press(Key::Right);
    g.tick(300.0);
    g.press(Key::Escape);
    assert_eq!(g.position(), (2, 5));
    assert_eq!(g.restarts(), 1);
    g.tick(300.0);
    assert_eq!(g.position(), (2, 5), "held keys are cleared");
}

#[test]
fn test_render_places_sprites() {
    let g = game(DEFAULT_LEVEL);
    let frame = g.render();
    let cs = g.config().cell_size;
    assert_eq!((frame.width(), frame.height()), (20 * cs, 8 * cs));

    let sprite = g.character_sprite();
    assert_eq!(frame.get(2 * cs, 5 * cs), sprite.get(0, 0));
    assert_eq!(frame.get(2 * cs + cs / 4, 5 * cs + cs / 4), sprite.get(cs / 4, cs / 4));

    let goal = g.goal_sprite();
    assert_eq!(frame.get(14 * cs + 3, 2 * cs + 7), goal.get(3, 7));
}

#[test]
fn test_invalid_config() {
    let result = Platformer::new(GameConfig {
        move_interval_ms: 0.0,
        ..GameConfig::default()
    });
    assert!(matches!(result, Err(AgentError::Config(_))));
}
