//! Development areas and the git trees patches in each area target.

/// A development area together with its tree naming convention.
pub struct DevArea {
    pub name: &'static str,
    /// Tree taking fixes for the current release.
    pub current_tree: &'static str,
    /// Tree taking material for the next merge window.
    pub next_tree: &'static str,
}

pub const DEV_AREAS: &[DevArea] = &[
    DevArea {
        name: "netdev",
        current_tree: "net",
        next_tree: "net-next",
    },
    DevArea {
        name: "wireless",
        current_tree: "wireless",
        next_tree: "wireless-next",
    },
];

pub fn lookup(name: &str) -> Option<&'static DevArea> {
    DEV_AREAS.iter().find(|area| area.name == name)
}

/// Full tree names in `area/tree` form, the way `--tree` expects them.
pub fn known_tree_names() -> Vec<String> {
    DEV_AREAS
        .iter()
        .flat_map(|area| {
            [
                format!("{}/{}", area.name, area.current_tree),
                format!("{}/{}", area.name, area.next_tree),
            ]
        })
        .collect()
}
