use build_engine::selection::{
    available_actions, build_slots_used, can_add_action, downcast_rank, effective_rank, eligible,
    is_downcast, slot_cost, slots_used,
};
use build_engine::{BuildState, Catalog, Rank, RankedPick};

fn catalog() -> Catalog {
    Catalog::builtin().unwrap()
}

#[test]
fn slot_cost_defaults_to_one() {
    let catalog = catalog();
    assert_eq!(slot_cost(catalog.action("rush").unwrap()), 1);
    assert_eq!(slot_cost(catalog.action("sniper").unwrap()), 2);
}

#[test]
fn pairs_are_charged_once() {
    let catalog = catalog();
    let picks = ["heal", "power-heal", "buff", "recover"].map(|a| catalog.action(a).unwrap());
    assert_eq!(slots_used(picks), 3);

    let build = BuildState {
        actions: vec!["protect".into(), "ultra-protect".into(), "ghost".into()],
        ..BuildState::default()
    };
    assert_eq!(build_slots_used(&build, &catalog), 1);
}

#[test]
fn budget_blocks_overflow() {
    let catalog = catalog();
    let build = BuildState {
        actions: vec![
            "overload".into(),
            "sniper".into(),
            "rush".into(),
            "counter".into(),
        ],
        ..BuildState::default()
    };
    let alert = catalog.action("alert").unwrap();
    let ultra = catalog.action("ultra-counter").unwrap();
    let overload = catalog.action("overload").unwrap();
    assert!(!can_add_action(&build, &catalog, alert, 6));
    // Shares the counter charge.
    assert!(can_add_action(&build, &catalog, ultra, 6));
    // Already chosen.
    assert!(!can_add_action(&build, &catalog, overload, 10));
}

#[test]
fn eligibility_from_either_side() {
    let catalog = catalog();
    let power = catalog.mastery("power").unwrap();
    let aura = catalog.mastery("aura").unwrap();
    assert!(eligible(catalog.action("normal-attack").unwrap(), power));
    assert!(eligible(catalog.action("swift").unwrap(), power));
    assert!(!eligible(catalog.action("sturdy").unwrap(), power));
    assert!(eligible(catalog.action("focus-defense").unwrap(), aura));
}

#[test]
fn available_actions_follow_chosen_masteries() {
    let catalog = catalog();
    let build = BuildState {
        masteries: vec![RankedPick::new("ranged", Rank::C)],
        ..BuildState::default()
    };
    let offered: Vec<&str> = available_actions(&build, &catalog)
        .iter()
        .map(|a| a.lookup.as_str())
        .collect();
    assert!(offered.contains(&"sniper"));
    assert!(offered.contains(&"swift"));
    assert!(!offered.contains(&"heal"));
    assert!(!offered.contains(&"speed"));
    assert!(available_actions(&BuildState::default(), &catalog).is_empty());
}

#[test]
fn downcast_outside_primary_role() {
    let catalog = catalog();
    let geomancy = catalog.mastery("geomancy").unwrap();
    let burst = catalog.action("burst").unwrap();
    let protect = catalog.action("protect").unwrap();
    let evolve = catalog.action("evolve").unwrap();

    assert!(is_downcast(burst, geomancy));
    assert!(!is_downcast(protect, geomancy));
    assert!(!is_downcast(evolve, geomancy));

    assert_eq!(effective_rank(burst, geomancy, Rank::A), Rank::B);
    assert_eq!(effective_rank(protect, geomancy, Rank::A), Rank::A);
    assert_eq!(downcast_rank(Rank::E), Rank::E);
}
