//! Cache key scheme.
//!
//! Keys are deterministic strings built from an entity's identity path. The
//! exact layout is load-bearing: out-of-process inspection tooling matches
//! on these shapes, and cascade invalidation deletes by path prefix.
//!
//! - `menu_id-{menu}`
//! - `menu_id-{menu}:submenu_id-{submenu}`
//! - `menu_id-{menu}:submenu_id-{submenu}:dish_id-{dish}`
//! - `submenus_list_{menu}`
//! - `dishes_list_{menu}_{submenu}`
//! - `list_menus`
//! - `all_menus`

use std::fmt;

use uuid::Uuid;

/// Addresses one cache entry: a point key, a list-view key, or the
/// full-hierarchy summary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Point key for a single menu.
    Menu { menu_id: Uuid },
    /// Point key for a single submenu.
    Submenu { menu_id: Uuid, submenu_id: Uuid },
    /// Point key for a single dish.
    Dish {
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    },
    /// Direct submenus of one menu, each with its dish count.
    SubmenuList { menu_id: Uuid },
    /// Direct dishes of one submenu.
    DishList { menu_id: Uuid, submenu_id: Uuid },
    /// All menus with their aggregate counts.
    MenuList,
    /// The entire menu → submenu → dish tree.
    FullSummary,
}

impl CacheKey {
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Menu { menu_id } => write!(f, "menu_id-{menu_id}"),
            CacheKey::Submenu {
                menu_id,
                submenu_id,
            } => write!(f, "menu_id-{menu_id}:submenu_id-{submenu_id}"),
            CacheKey::Dish {
                menu_id,
                submenu_id,
                dish_id,
            } => write!(
                f,
                "menu_id-{menu_id}:submenu_id-{submenu_id}:dish_id-{dish_id}"
            ),
            CacheKey::SubmenuList { menu_id } => write!(f, "submenus_list_{menu_id}"),
            CacheKey::DishList {
                menu_id,
                submenu_id,
            } => write!(f, "dishes_list_{menu_id}_{submenu_id}"),
            CacheKey::MenuList => f.write_str("list_menus"),
            CacheKey::FullSummary => f.write_str("all_menus"),
        }
    }
}

/// Prefix covering a menu's point key and every path-addressed descendant.
pub fn menu_subtree_prefix(menu_id: Uuid) -> String {
    format!("menu_id-{menu_id}")
}

/// Prefix covering a submenu's point key and its dishes' point keys.
pub fn submenu_subtree_prefix(menu_id: Uuid, submenu_id: Uuid) -> String {
    format!("menu_id-{menu_id}:submenu_id-{submenu_id}")
}

/// Prefix covering every dish-list key under a menu. Dish-list keys are not
/// nested under the menu's path prefix, so menu deletion sweeps them
/// separately.
pub fn dish_list_prefix(menu_id: Uuid) -> String {
    format!("dishes_list_{menu_id}_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Uuid, Uuid, Uuid) {
        (
            "11111111-1111-4111-8111-111111111111".parse().unwrap(),
            "22222222-2222-4222-8222-222222222222".parse().unwrap(),
            "33333333-3333-4333-8333-333333333333".parse().unwrap(),
        )
    }

    #[test]
    fn point_key_layout_is_stable() {
        let (m, s, d) = ids();
        assert_eq!(
            CacheKey::Menu { menu_id: m }.render(),
            format!("menu_id-{m}")
        );
        assert_eq!(
            CacheKey::Submenu {
                menu_id: m,
                submenu_id: s
            }
            .render(),
            format!("menu_id-{m}:submenu_id-{s}")
        );
        assert_eq!(
            CacheKey::Dish {
                menu_id: m,
                submenu_id: s,
                dish_id: d
            }
            .render(),
            format!("menu_id-{m}:submenu_id-{s}:dish_id-{d}")
        );
    }

    #[test]
    fn list_and_summary_key_layout_is_stable() {
        let (m, s, _) = ids();
        assert_eq!(
            CacheKey::SubmenuList { menu_id: m }.render(),
            format!("submenus_list_{m}")
        );
        assert_eq!(
            CacheKey::DishList {
                menu_id: m,
                submenu_id: s
            }
            .render(),
            format!("dishes_list_{m}_{s}")
        );
        assert_eq!(CacheKey::MenuList.render(), "list_menus");
        assert_eq!(CacheKey::FullSummary.render(), "all_menus");
    }

    #[test]
    fn subtree_prefixes_cover_descendant_point_keys() {
        let (m, s, d) = ids();
        let dish_key = CacheKey::Dish {
            menu_id: m,
            submenu_id: s,
            dish_id: d,
        }
        .render();

        assert!(dish_key.starts_with(&menu_subtree_prefix(m)));
        assert!(dish_key.starts_with(&submenu_subtree_prefix(m, s)));
    }

    #[test]
    fn dish_list_prefix_matches_only_lists_under_menu() {
        let (m, s, _) = ids();
        let list_key = CacheKey::DishList {
            menu_id: m,
            submenu_id: s,
        }
        .render();

        assert!(list_key.starts_with(&dish_list_prefix(m)));
        assert!(!CacheKey::SubmenuList { menu_id: m }
            .render()
            .starts_with(&dish_list_prefix(m)));
    }
}
