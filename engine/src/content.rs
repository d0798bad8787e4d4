use std::collections::HashMap;

/// Catalog bundled with the engine.
pub const BUILTIN_CATALOG: &str = include_str!("../content/catalog.json");

/// Rule sets bundled with the engine, by name.
pub fn builtin_rules() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("default", include_str!("../content/rules/default.yaml")),
        ("classic", include_str!("../content/rules/classic.yaml")),
    ])
}
