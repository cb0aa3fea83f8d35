mod support;

use std::collections::BTreeMap;

use geocoin_core::{CellKey, Command, Direction, Event, Luck, TokenValue};
use geocoin_system_luck::Sha256Luck;
use geocoin_world::{self as world, query, TokenRetention, WorldConfig};
use proptest::prelude::*;

use support::{world_with, EverywhereLuck, TableLuck};

fn values(world: &world::World) -> BTreeMap<CellKey, TokenValue> {
    query::cache_view(world)
        .iter()
        .map(|snapshot| (snapshot.key, snapshot.value))
        .collect()
}

fn step(world: &mut world::World, direction: Direction) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Move { direction }, &mut events).expect("move succeeds");
    events
}

#[test]
fn spawn_decision_and_initial_value_follow_luck() {
    let luck = TableLuck::default()
        .with("0,0", 0.05)
        .with("0,0:initialValue", 0.23)
        .with("1,1", 0.1);
    let (world, events) = world_with(WorldConfig::default(), luck);

    assert_eq!(query::spawn_decision(&world, CellKey::new(0, 0)), Some(true));
    assert_eq!(query::spawn_decision(&world, CellKey::new(1, 1)), Some(false));
    assert_eq!(
        query::cache(&world, CellKey::new(0, 0)).map(|cache| cache.value),
        Some(TokenValue::new(4))
    );

    let spawned: Vec<CellKey> = events
        .iter()
        .filter_map(|event| match event {
            Event::CacheSpawned { key, .. } => Some(*key),
            _ => None,
        })
        .collect();
    assert_eq!(spawned, vec![CellKey::new(0, 0)]);
}

#[test]
fn initial_window_spans_half_open_range() {
    let (world, _) = world_with(WorldConfig::default(), EverywhereLuck);

    let keys: Vec<CellKey> = query::cache_view(&world).keys().collect();
    assert_eq!(keys.len(), 36);
    for key in &keys {
        assert!((-3..=2).contains(&key.i()), "unexpected row in {key}");
        assert!((-3..=2).contains(&key.j()), "unexpected column in {key}");
    }
}

#[test]
fn moving_east_shifts_one_column() {
    let (mut world, _) = world_with(WorldConfig::default(), EverywhereLuck);
    let before = values(&world);

    let events = step(&mut world, Direction::East);

    assert_eq!(query::player_cell(&world), CellKey::new(0, 1));

    let despawned: Vec<CellKey> = events
        .iter()
        .filter_map(|event| match event {
            Event::CacheDespawned { key } => Some(*key),
            _ => None,
        })
        .collect();
    let spawned: Vec<CellKey> = events
        .iter()
        .filter_map(|event| match event {
            Event::CacheSpawned { key, .. } => Some(*key),
            _ => None,
        })
        .collect();

    assert_eq!(despawned, (-3..=2).map(|i| CellKey::new(i, -3)).collect::<Vec<_>>());
    assert_eq!(spawned, (-3..=2).map(|i| CellKey::new(i, 3)).collect::<Vec<_>>());

    let after = values(&world);
    for (key, value) in &before {
        if key.j() == -3 {
            assert!(!after.contains_key(key));
        } else {
            assert_eq!(after.get(key), Some(value), "cache {key} changed");
        }
    }
    assert!(matches!(
        events.last(),
        Some(Event::PlayerMoved { cell, .. }) if *cell == CellKey::new(0, 1)
    ));
}

#[test]
fn overlapping_caches_keep_exchanged_values() {
    let (mut world, _) = world_with(WorldConfig::default(), EverywhereLuck);
    let key = CellKey::new(0, 0);
    let mut events = Vec::new();
    world::apply(&mut world, Command::Interact { key }, &mut events).expect("active cache");
    let held = query::held_value(&world);
    assert!(!held.is_zero());

    for direction in [Direction::North, Direction::East, Direction::South, Direction::West] {
        let _ = step(&mut world, direction);
        assert_eq!(
            query::cache(&world, key).map(|cache| cache.value),
            Some(TokenValue::ZERO)
        );
    }
    assert_eq!(query::held_value(&world), held);
}

#[test]
fn retained_tokens_survive_leaving_the_window() {
    let (mut world, _) = world_with(WorldConfig::default(), EverywhereLuck);
    let key = CellKey::new(-3, 0);
    let mut events = Vec::new();
    world::apply(&mut world, Command::Interact { key }, &mut events).expect("active cache");

    let _ = step(&mut world, Direction::North);
    assert!(query::cache(&world, key).is_none());
    assert_eq!(query::retained_value(&world, key), Some(TokenValue::ZERO));

    let _ = step(&mut world, Direction::South);
    assert_eq!(
        query::cache(&world, key).map(|cache| cache.value),
        Some(TokenValue::ZERO)
    );
}

#[test]
fn reentered_cache_is_no_longer_retained() {
    let (mut world, _) = world_with(WorldConfig::default(), EverywhereLuck);
    let key = CellKey::new(-3, 0);
    let mut events = Vec::new();
    world::apply(&mut world, Command::Interact { key }, &mut events).expect("active cache");
    let taken = query::held_value(&world);

    let _ = step(&mut world, Direction::North);
    let _ = step(&mut world, Direction::South);
    assert_eq!(query::retained_value(&world, key), None);

    world::apply(&mut world, Command::Interact { key }, &mut events).expect("active cache");
    assert_eq!(query::cache(&world, key).map(|cache| cache.value), Some(taken));
    assert_eq!(query::held_value(&world), TokenValue::ZERO);
    assert_eq!(query::retained_value(&world, key), None);
}

#[test]
fn discarded_tokens_regenerate_on_reentry() {
    let config = WorldConfig {
        token_retention: TokenRetention::Discard,
        ..WorldConfig::default()
    };
    let (mut world, _) = world_with(config, EverywhereLuck);
    let key = CellKey::new(-3, 0);
    let original = query::cache(&world, key).map(|cache| cache.value);
    let mut events = Vec::new();
    world::apply(&mut world, Command::Interact { key }, &mut events).expect("active cache");

    let _ = step(&mut world, Direction::North);
    let _ = step(&mut world, Direction::South);

    assert_eq!(query::cache(&world, key).map(|cache| cache.value), original);
    assert_eq!(query::retained_value(&world, key), None);
}

#[test]
fn relocating_far_away_replaces_the_window() {
    let (mut world, _) = world_with(WorldConfig::default(), EverywhereLuck);
    let grid = *query::grid(&world);
    let target = CellKey::new(100, -50);
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::Relocate {
            position: grid.center_of(target),
        },
        &mut events,
    )
    .expect("relocate succeeds");

    assert_eq!(query::player_cell(&world), target);
    let despawned = events
        .iter()
        .filter(|event| matches!(event, Event::CacheDespawned { .. }))
        .count();
    assert_eq!(despawned, 36);
    for key in query::cache_view(&world).keys() {
        assert!(query::in_window(&world, key));
    }
}

#[test]
fn revisited_cells_are_not_decided_twice() {
    let (mut world, _) = world_with(WorldConfig::default(), Sha256Luck::new());
    assert_eq!(query::decided_cell_count(&world), 36);

    let _ = step(&mut world, Direction::East);
    assert_eq!(query::decided_cell_count(&world), 42);

    let _ = step(&mut world, Direction::West);
    assert_eq!(query::decided_cell_count(&world), 42);
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::East),
        Just(Direction::South),
        Just(Direction::West),
    ]
}

proptest! {
    #[test]
    fn active_caches_match_window_and_decisions(
        moves in prop::collection::vec(direction_strategy(), 0..24),
        radius in 1u32..5,
    ) {
        let config = WorldConfig {
            neighborhood_size: radius,
            spawn_probability: 0.3,
            ..WorldConfig::default()
        };
        let (mut world, _) = world_with(config, Sha256Luck::new());
        for direction in moves {
            let _ = step(&mut world, direction);
        }

        let center = query::player_cell(&world);
        let radius = i32::try_from(radius).expect("small radius");
        let luck = Sha256Luck::new();
        let mut expected = Vec::new();
        for i in center.i() - radius..center.i() + radius {
            for j in center.j() - radius..center.j() + radius {
                let key = CellKey::new(i, j);
                if luck.luck(&key.to_string()) < 0.3 {
                    expected.push(key);
                }
            }
        }
        expected.sort();

        let active: Vec<CellKey> = query::cache_view(&world).keys().collect();
        prop_assert_eq!(active, expected);
    }

    #[test]
    fn spawn_decisions_never_change(moves in prop::collection::vec(direction_strategy(), 1..16)) {
        let (mut world, _) = world_with(WorldConfig::default(), Sha256Luck::new());
        let origin_decisions: Vec<Option<bool>> = (-3..3)
            .flat_map(|i| (-3..3).map(move |j| CellKey::new(i, j)))
            .map(|key| query::spawn_decision(&world, key))
            .collect();

        for direction in moves {
            let _ = step(&mut world, direction);
        }

        let later: Vec<Option<bool>> = (-3..3)
            .flat_map(|i| (-3..3).map(move |j| CellKey::new(i, j)))
            .map(|key| query::spawn_decision(&world, key))
            .collect();
        prop_assert_eq!(origin_decisions, later);
    }
}
