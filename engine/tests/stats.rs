use build_engine::config::Features;
use build_engine::stats::{
    build_grade, build_score, calculate_hp, calculate_movement, calculate_range, calculate_saves,
    highest_rank_for_action,
};
use build_engine::{
    rank_bonus, AccessoryType, ArmorType, BuildState, Catalog, Engine, Rank, RankedPick,
    RulesConfig, Saves,
};

fn catalog() -> Catalog {
    Catalog::builtin().unwrap()
}

fn with_actions(masteries: &[(&str, Rank)], actions: &[&str]) -> BuildState {
    BuildState {
        masteries: masteries
            .iter()
            .map(|(lookup, rank)| RankedPick::new(*lookup, *rank))
            .collect(),
        actions: actions.iter().map(|a| a.to_string()).collect(),
        ..BuildState::default()
    }
}

#[test]
fn rank_bonus_table_is_exact() {
    let bonuses: Vec<i32> = (0..=5).map(rank_bonus).collect();
    assert_eq!(bonuses, vec![0, 10, 15, 25, 30, 40]);
    assert_eq!(rank_bonus(-1), 0);
    assert_eq!(rank_bonus(6), 0);
    let by_rank: Vec<i32> = Rank::ALL.iter().map(|r| r.bonus()).collect();
    assert_eq!(by_rank, bonuses);
}

#[test]
fn heavy_armor_rank_three_is_190_hp() {
    let build = BuildState {
        armor: Some(ArmorType::Heavy),
        armor_rank: Rank::B,
        ..BuildState::default()
    };
    assert_eq!(calculate_hp(&build, &catalog()), 190);
}

#[test]
fn armor_hp_scales_by_weight() {
    let catalog = catalog();
    for (armor, expected) in [
        (ArmorType::Light, 200),
        (ArmorType::Medium, 225),
        (ArmorType::Heavy, 250),
    ] {
        let build = BuildState {
            armor: Some(armor),
            armor_rank: Rank::S,
            ..BuildState::default()
        };
        assert_eq!(calculate_hp(&build, &catalog), expected, "{armor:?}");
    }
    assert_eq!(calculate_hp(&BuildState::default(), &catalog), 100);
}

#[test]
fn will_mastery_at_a_gives_30_will() {
    let build = with_actions(&[("spellbane", Rank::A)], &[]);
    let saves = calculate_saves(&build, &catalog(), &RulesConfig::default());
    assert_eq!(
        saves,
        Saves {
            fortitude: 0,
            reflex: 0,
            will: 30
        }
    );
}

#[test]
fn accessory_adds_to_its_save() {
    let catalog = catalog();
    let rules = RulesConfig::default();
    let mut build = BuildState {
        accessory: Some(AccessoryType::Combat),
        accessory_rank: Rank::E,
        ..BuildState::default()
    };
    assert_eq!(calculate_saves(&build, &catalog, &rules).fortitude, 10);

    build.accessory = Some(AccessoryType::Utility);
    build.accessory_rank = Rank::S;
    assert_eq!(calculate_saves(&build, &catalog, &rules).reflex, 60);

    let no_accessories = RulesConfig {
        features: Features {
            accessory: false,
            ..Features::default()
        },
        ..RulesConfig::default()
    };
    assert_eq!(calculate_saves(&build, &catalog, &no_accessories), Saves::default());
}

#[test]
fn alter_passives_use_the_alter_rank() {
    let catalog = catalog();
    let mut build = with_actions(&[("power", Rank::S)], &["defense", "focus-defense"]);
    build.alter = Some(RankedPick::new("mend", Rank::B));
    // defense: B bonus 25, focus-defense at B: 30
    assert_eq!(calculate_hp(&build, &catalog), 155);

    let saves = calculate_saves(&build, &catalog, &RulesConfig::default());
    assert_eq!(saves.will, 15);
    assert_eq!(saves.fortitude, 40 + 15);
}

#[test]
fn last_mastery_stands_in_for_missing_alter_slot() {
    let build = with_actions(&[("power", Rank::E), ("precision", Rank::C)], &["defense"]);
    assert_eq!(build.alter_rank(), Rank::C);
    assert_eq!(calculate_hp(&build, &catalog()), 115);
    assert_eq!(BuildState::default().alter_rank(), Rank::E);
}

#[test]
fn sturdy_uses_best_defense_mastery_and_caps() {
    let catalog = catalog();
    let build = with_actions(
        &[("guard-arts", Rank::C), ("geomancy", Rank::A), ("power", Rank::S)],
        &["sturdy"],
    );
    assert_eq!(highest_rank_for_action(&build, &catalog, "sturdy"), Rank::A);
    assert_eq!(calculate_hp(&build, &catalog), 100 + 45);

    let capped = with_actions(&[("spellbane", Rank::S)], &["sturdy"]);
    assert_eq!(calculate_hp(&capped, &catalog), 150);

    let none = with_actions(&[("power", Rank::S)], &["sturdy"]);
    assert_eq!(calculate_hp(&none, &catalog), 125);
    assert_eq!(highest_rank_for_action(&none, &catalog, "no-such-action"), Rank::E);
}

#[test]
fn movement_passives() {
    let catalog = catalog();
    let mut build = with_actions(&[("ranged", Rank::S)], &["swift", "mobile"]);
    // swift at S: +2, mobile: +1
    assert_eq!(calculate_movement(&build, &catalog), 5);

    build.alter = Some(RankedPick::new("evoke", Rank::B));
    build.actions = vec!["speed".into(), "acceleration".into(), "focus-movement".into()];
    // speed at B: +2, acceleration at B: +3, focus-movement at B: +2
    assert_eq!(calculate_movement(&build, &catalog), 2 + 2 + 3 + 2);

    build.alter = Some(RankedPick::new("evoke", Rank::E));
    assert_eq!(calculate_movement(&build, &catalog), 2);
}

#[test]
fn range_adds_flat_bonuses() {
    let build = with_actions(&[("precision", Rank::B)], &["reach", "sniper"]);
    assert_eq!(calculate_range(&build, &catalog()), 4);
    assert_eq!(calculate_range(&BuildState::default(), &catalog()), 1);
}

#[test]
fn score_and_grade() {
    let rules = RulesConfig::default();
    let build = BuildState {
        masteries: vec![RankedPick::new("power", Rank::S)],
        expertise: vec![
            RankedPick::new("fitness", Rank::D),
            RankedPick::new("lore", Rank::A),
        ],
        weapon_rank: Rank::B,
        armor_rank: Rank::C,
        accessory_rank: Rank::D,
        ..BuildState::default()
    };
    // 25 + 15 + 10 + 40 + round(2.5) + round(7.5)
    assert_eq!(build_score(&build, &rules), 90 + 3 + 8);

    assert_eq!(build_grade(0), "E");
    assert_eq!(build_grade(30), "E");
    assert_eq!(build_grade(31), "E+");
    assert_eq!(build_grade(185), "C+");
    assert_eq!(build_grade(186), "B");
    assert_eq!(build_grade(338), "S");
    assert_eq!(build_grade(339), "S+");
    assert_eq!(build_grade(400), "S+");
}

#[test]
fn complete_stats_summary() {
    let engine = Engine::builtin().unwrap();
    let build = engine
        .decode("#import.djN8NiwzLDEzfDQzNXwxLDd8MjF8aHwzfG18Mnw0fDEsMTMsMTUsOXxuOkx1bmVfVmFsZSZyOkh1bWFuJnQ6U3RlZWxfUmVjbGFpbWVyJmM6VFMtMDEmbmc6MQ==")
        .unwrap();
    insta::assert_debug_snapshot!(engine.compute_stats(&build), @r###"
    Stats {
        hp: 230,
        saves: Saves {
            fortitude: 45,
            reflex: 50,
            will: 50,
        },
        movement: 3,
        range: 1,
        damage_modifiers: [
            40,
        ],
        support_modifiers: [],
        score: 172,
        grade: "C+",
    }
    "###);
}
