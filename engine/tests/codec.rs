use build_engine::codec::{self, BuildFormat};
use build_engine::{
    AccessoryType, ArmorType, BuildState, Catalog, CharacterInfo, DecodeError, Engine, Rank,
    RankedPick,
};

fn engine() -> Engine {
    Engine::builtin().unwrap()
}

fn lune() -> BuildState {
    BuildState {
        masteries: vec![
            RankedPick::new("precision", Rank::A),
            RankedPick::new("guard-arts", Rank::B),
        ],
        alter: Some(RankedPick::new("aura", Rank::S)),
        expertise: vec![
            RankedPick::new("fitness", Rank::C),
            RankedPick::new("lore", Rank::D),
        ],
        armor: Some(ArmorType::Heavy),
        armor_rank: Rank::B,
        accessory: Some(AccessoryType::Magic),
        accessory_rank: Rank::C,
        weapon_rank: Rank::A,
        actions: vec![
            "normal-attack".into(),
            "swift".into(),
            "focus-defense".into(),
            "damage".into(),
        ],
        character: CharacterInfo {
            name: "Lune Vale".into(),
            race: "Human".into(),
            title: "Steel Reclaimer".into(),
            thread_code: "TS-01".into(),
            ng: true,
            ..CharacterInfo::default()
        },
    }
}

#[test]
fn canonical_payload_layout() {
    let engine = engine();
    let token = engine.encode(&lune());
    insta::assert_snapshot!(codec::payload_text(&token).unwrap(), @"v3|6,3,13|435|1,7|21|h|3|m|2|4|1,13,15,9|n:Lune_Vale&r:Human&t:Steel_Reclaimer&c:TS-01&ng:1");
    insta::assert_snapshot!(token, @"#import.djN8NiwzLDEzfDQzNXwxLDd8MjF8aHwzfG18Mnw0fDEsMTMsMTUsOXxuOkx1bmVfVmFsZSZyOkh1bWFuJnQ6U3RlZWxfUmVjbGFpbWVyJmM6VFMtMDEmbmc6MQ==");
}

#[test]
fn empty_build_keeps_every_field() {
    let engine = engine();
    let token = engine.encode(&BuildState::new());
    assert_eq!(token, "#import.djN8fHx8fHwwfHwwfDB8fA==");
    assert_eq!(engine.decode(&token).unwrap(), BuildState::new());
}

#[test]
fn round_trips_full_build() {
    let engine = engine();
    let build = lune();
    assert_eq!(engine.decode(&engine.encode(&build)).unwrap(), build);
}

#[test]
fn free_text_with_reserved_characters_round_trips() {
    let engine = engine();
    let mut build = lune();
    build.character = CharacterInfo {
        name: "Zoë_the | Bold & Brave: 100%".into(),
        race: "Sky-kin (half)".into(),
        title: "%20 literally".into(),
        thread_code: "a_b c".into(),
        note: "Line one\nline two & more | pipes".into(),
        profile_banner_url: "https://example.com/banners/me.png".into(),
        avatar_url: "https://terrarp.com/data/avatars/l/0/7.jpg?123".into(),
        ng: false,
    };
    assert_eq!(engine.decode(&engine.encode(&build)).unwrap(), build);
}

#[test]
fn forum_banner_is_shortened() {
    let engine = engine();
    let mut build = BuildState::new();
    build.character.profile_banner_url =
        "https://terrarp.com/data/profile_banners/l/0/135.jpg?1718997316".into();
    let text = codec::payload_text(&engine.encode(&build)).unwrap();
    assert!(text.ends_with("|b:135.jpg?1718997316"), "{text}");
    assert_eq!(engine.decode(&engine.encode(&build)).unwrap(), build);
}

#[test]
fn bare_image_name_is_not_mistaken_for_forum_banner() {
    let engine = engine();
    let mut build = BuildState::new();
    build.character.profile_banner_url = "me.png".into();
    assert_eq!(engine.decode(&engine.encode(&build)).unwrap(), build);
}

#[test]
fn unknown_mastery_is_dropped_with_its_rank() {
    let engine = engine();
    let token = engine.encode(&lune());

    let mut data: serde_json::Value =
        serde_json::from_str(build_engine::content::BUILTIN_CATALOG).unwrap();
    let masteries = data["masteries"].as_array_mut().unwrap();
    masteries.retain(|m| m["lookup"] != "precision");
    let reduced = Catalog::from_json_str(&data.to_string()).unwrap();

    let build = codec::decode(&token, &reduced).unwrap();
    assert_eq!(build.masteries, vec![RankedPick::new("guard-arts", Rank::B)]);
    assert_eq!(build.alter, Some(RankedPick::new("aura", Rank::S)));
    assert_eq!(build.actions.len(), 4);
}

#[test]
fn unknown_lookup_encodes_as_zero_and_is_dropped() {
    let engine = engine();
    let mut build = lune();
    build.masteries.insert(0, RankedPick::new("retired-mastery", Rank::D));
    let token = engine.encode(&build);
    assert!(codec::payload_text(&token).unwrap().starts_with("v3|0,6,3,13|1435|"));

    let decoded = engine.decode(&token).unwrap();
    assert_eq!(decoded, lune());
    assert_eq!(decoded.mastery_ranks().len(), decoded.mastery_count());
}

#[test]
fn accepts_urls_and_other_markers() {
    let engine = engine();
    let token = engine.encode(&lune());
    let payload = token.trim_start_matches("#import.");
    for wrapped in [
        format!("https://terrarp.com/build/index.html{}", token),
        format!("#compact-import.{}", payload),
        format!("#compact.{}", payload),
        format!("  #sample.{}\n", payload),
        payload.to_string(),
        payload.trim_end_matches('=').to_string(),
        payload.replace('=', "%3D"),
    ] {
        assert_eq!(engine.decode(&wrapped).unwrap(), lune(), "{wrapped}");
    }
}

#[test]
fn rejects_malformed_tokens() {
    let engine = engine();
    assert!(matches!(engine.decode("#import."), Err(DecodeError::MissingPayload)));
    assert!(matches!(engine.decode("#share.abcd"), Err(DecodeError::UnknownMarker(_))));
    assert!(matches!(engine.decode("#import.@@@@"), Err(DecodeError::Base64(_))));
    // "a|b|c"
    assert!(matches!(
        engine.decode("YXxifGM="),
        Err(DecodeError::UnsupportedLayout { fields: 3 })
    ));
    // "v3|1|2"
    assert!(matches!(
        engine.decode("djN8MXwy"),
        Err(DecodeError::CanonicalFieldCount { found: 3 })
    ));
}

#[test]
fn reads_latin1_payloads() {
    let engine = engine();
    let utf8 = engine.decode("djN8Nnw0fHx8fDB8fDB8MHx8bjpab8Or").unwrap();
    let latin1 = engine.decode("djN8Nnw0fHx8fDB8fDB8MHx8bjpab+s=").unwrap();
    assert_eq!(utf8.character.name, "Zoë");
    assert_eq!(latin1.character.name, "Zoë");
}

#[test]
fn decodes_untagged_accessory_layout() {
    let engine = engine();
    let decoded = engine
        .decode_raw("NiwzLDEzfDQzNXwxLDd8MjF8aHwzfG18Mnw0fDEsMTMsMTUsOXxuOkx1bmVfVmFsZSZyOkh1bWFu")
        .unwrap();
    assert_eq!(decoded.format, BuildFormat::AccessoryCompact);

    let build = decoded.wire.into_build(engine.catalog());
    let mut expected = lune();
    expected.character = CharacterInfo {
        name: "Lune Vale".into(),
        race: "Human".into(),
        ..CharacterInfo::default()
    };
    assert_eq!(build, expected);
}

#[test]
fn decodes_untagged_expertise_layout() {
    let engine = engine();
    // "6,13|45|1|2|m|2|3|1,9"
    let decoded = engine.decode_raw("NiwxM3w0NXwxfDJ8bXwyfDN8MSw5").unwrap();
    assert_eq!(decoded.format, BuildFormat::ExpertiseCompact);

    let build = decoded.wire.into_build(engine.catalog());
    assert_eq!(build.masteries, vec![RankedPick::new("precision", Rank::A)]);
    assert_eq!(build.alter, Some(RankedPick::new("aura", Rank::S)));
    assert_eq!(build.expertise, vec![RankedPick::new("fitness", Rank::C)]);
    assert_eq!(build.armor, Some(ArmorType::Medium));
    assert_eq!(build.armor_rank, Rank::C);
    assert_eq!(build.weapon_rank, Rank::B);
    assert_eq!(build.accessory, None);
    assert_eq!(build.actions, vec!["normal-attack", "damage"]);
}

#[test]
fn decodes_classic_compact_layout() {
    let engine = engine();
    // "7,14|35|l|4|2|1,14|n:Old_Timer"
    let decoded = engine.decode_raw("NywxNHwzNXxsfDR8MnwxLDE0fG46T2xkX1RpbWVy").unwrap();
    assert_eq!(decoded.format, BuildFormat::ClassicCompact);

    let build = decoded.wire.into_build(engine.catalog());
    assert_eq!(build.masteries, vec![RankedPick::new("power", Rank::B)]);
    assert_eq!(build.alter, Some(RankedPick::new("evoke", Rank::S)));
    assert_eq!(build.armor, Some(ArmorType::Light));
    assert_eq!(build.armor_rank, Rank::A);
    assert_eq!(build.weapon_rank, Rank::C);
    assert_eq!(build.actions, vec!["normal-attack", "acceleration"]);
    assert_eq!(build.character.name, "Old Timer");
}

#[test]
fn decodes_pipe_lookup_layout() {
    let engine = engine();
    let decoded = engine
        .decode_raw("cG93ZXIsZXZva2V8Myw1fGxpZ2h0fDR8Mnxub3JtYWwtYXR0YWNrLGFjY2VsZXJhdGlvbnxPbGRfVGltZXJ8RWxmfFRoZV9GaXJzdHxUUy05fGh0dHBzJTNBJTJGJTJGZXhhbXBsZS5jb20lMkZiLnBuZw==")
        .unwrap();
    assert_eq!(decoded.format, BuildFormat::PipeLookup);

    let build = decoded.wire.into_build(engine.catalog());
    assert_eq!(build.masteries, vec![RankedPick::new("power", Rank::B)]);
    assert_eq!(build.alter, Some(RankedPick::new("evoke", Rank::S)));
    assert_eq!(build.armor, Some(ArmorType::Light));
    assert_eq!(
        build.character,
        CharacterInfo {
            name: "Old Timer".into(),
            race: "Elf".into(),
            title: "The First".into(),
            thread_code: "TS-9".into(),
            profile_banner_url: "https://example.com/b.png".into(),
            ..CharacterInfo::default()
        }
    );
}

#[test]
fn decodes_dot_v1_layout() {
    let engine = engine();
    // "power,evoke.3,5.heavy.2.1.normal-attack,acceleration.Lune_Vale.TS-01.https%3A%2F%2Fexample%2Eorg%2Fb%2Epng"
    let decoded = engine
        .decode_raw("cG93ZXIsZXZva2UuMyw1LmhlYXZ5LjIuMS5ub3JtYWwtYXR0YWNrLGFjY2VsZXJhdGlvbi5MdW5lX1ZhbGUuVFMtMDEuaHR0cHMlM0ElMkYlMkZleGFtcGxlJTJFb3JnJTJGYiUyRXBuZw==")
        .unwrap();
    assert_eq!(decoded.format, BuildFormat::DotV1);

    let build = decoded.wire.into_build(engine.catalog());
    assert_eq!(build.armor, Some(ArmorType::Heavy));
    assert_eq!(build.armor_rank, Rank::C);
    assert_eq!(build.weapon_rank, Rank::D);
    assert_eq!(build.actions, vec!["normal-attack", "acceleration"]);
    assert_eq!(build.character.name, "Lune Vale");
    assert_eq!(build.character.thread_code, "TS-01");
    assert_eq!(build.character.title, "");
    assert_eq!(build.character.profile_banner_url, "https://example.org/b.png");
}

#[test]
fn dot_v1_without_character_fields() {
    // "power.3.light.1.0.normal-attack"
    let build = engine().decode("cG93ZXIuMy5saWdodC4xLjAubm9ybWFsLWF0dGFjaw==").unwrap();
    assert_eq!(build.masteries, vec![RankedPick::new("power", Rank::B)]);
    assert_eq!(build.character, CharacterInfo::default());
}

#[test]
fn json_format_round_trips() {
    let engine = engine();
    let mut build = lune();
    build.character.note = "Prefers the long way round".into();
    let token = engine.encode_json(&build);
    assert_eq!(engine.decode_raw(&token).unwrap().format, BuildFormat::Json);
    assert_eq!(engine.decode(&token).unwrap(), build);
}

#[test]
fn json_format_tolerates_string_ranks() {
    let engine = engine();
    let json = r#"{"chosenMasteries":["ranged","mend"],"chosenMasteriesRanks":["3",5],
        "armorType":"medium","armorRank":"2","weaponRank":1,"chosenActions":["reach"],
        "characterName":"Wren","ng":1}"#;
    let token = codec::encode_payload(json);
    let build = engine.decode(&token).unwrap();
    assert_eq!(build.masteries, vec![RankedPick::new("ranged", Rank::B)]);
    assert_eq!(build.alter, Some(RankedPick::new("mend", Rank::S)));
    assert_eq!(build.armor, Some(ArmorType::Medium));
    assert_eq!(build.armor_rank, Rank::C);
    assert_eq!(build.character.name, "Wren");
    assert!(build.character.ng);
}

#[test]
fn broken_json_reports_json_error() {
    let engine = engine();
    let token = codec::encode_payload("{\"chosenMasteries\": [");
    assert!(matches!(engine.decode(&token), Err(DecodeError::Json(_))));
}

#[test]
fn reencoding_decodes_to_same_build() {
    let engine = engine();
    // Older layout in, canonical layout out.
    let legacy = "NiwxM3w0NXwxfDJ8bXwyfDN8MSw5";
    let first = engine.decode(legacy).unwrap();
    let second = engine.decode(&engine.encode(&first)).unwrap();
    assert_eq!(first, second);
}
