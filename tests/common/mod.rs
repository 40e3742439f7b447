//! Shared fixtures: an in-memory catalog implementing the repository
//! traits (with cascade deletes and unique titles, like the Postgres
//! schema) and a cache store that always fails.

// Each test binary uses its own slice of these fixtures.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use tavolo::application::repos::{
    DishesRepo, MenusRepo, NewDish, NewMenu, NewSubmenu, RepoError, SubmenusRepo, UpdateDish,
    UpdateMenu, UpdateSubmenu,
};
use tavolo::application::{CatalogSync, DishService, MenuService, SubmenuService};
use tavolo::cache::{
    CacheConfig, CacheConsumer, CacheError, CacheStore, CacheTrigger, EventQueue, MemoryStore,
};
use tavolo::domain::entities::{
    DishRecord, MenuRecord, MenuTree, MenuWithCounts, SubmenuRecord, SubmenuTree,
    SubmenuWithCounts,
};

#[derive(Default)]
struct State {
    menus: HashMap<Uuid, MenuRecord>,
    submenus: HashMap<Uuid, SubmenuRecord>,
    dishes: HashMap<Uuid, DishRecord>,
}

impl State {
    fn submenu_count(&self, menu_id: Uuid) -> i64 {
        self.submenus
            .values()
            .filter(|s| s.menu_id == menu_id)
            .count() as i64
    }

    fn dish_count_for_menu(&self, menu_id: Uuid) -> i64 {
        self.dishes
            .values()
            .filter(|d| {
                self.submenus
                    .get(&d.submenu_id)
                    .is_some_and(|s| s.menu_id == menu_id)
            })
            .count() as i64
    }

    fn dish_count_for_submenu(&self, submenu_id: Uuid) -> i64 {
        self.dishes
            .values()
            .filter(|d| d.submenu_id == submenu_id)
            .count() as i64
    }
}

/// One struct implementing all three repository traits over shared state,
/// so deletes can cascade across entity kinds the way foreign keys do.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<State>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("catalog state lock")
    }

    pub fn menu_rows(&self) -> usize {
        self.lock().menus.len()
    }

    pub fn submenu_rows(&self) -> usize {
        self.lock().submenus.len()
    }

    pub fn dish_rows(&self) -> usize {
        self.lock().dishes.len()
    }
}

#[async_trait]
impl MenusRepo for InMemoryCatalog {
    async fn insert(&self, params: NewMenu) -> Result<MenuRecord, RepoError> {
        let mut state = self.lock();
        if state.menus.values().any(|m| m.title == params.title) {
            return Err(RepoError::Duplicate {
                constraint: "menus_title_key".to_string(),
            });
        }
        let menu = MenuRecord {
            id: Uuid::new_v4(),
            title: params.title,
            description: params.description,
        };
        state.menus.insert(menu.id, menu.clone());
        Ok(menu)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError> {
        Ok(self.lock().menus.get(&id).cloned())
    }

    async fn find_with_counts(&self, id: Uuid) -> Result<Option<MenuWithCounts>, RepoError> {
        let state = self.lock();
        Ok(state.menus.get(&id).cloned().map(|menu| MenuWithCounts {
            submenus_count: state.submenu_count(menu.id),
            dishes_count: state.dish_count_for_menu(menu.id),
            menu,
        }))
    }

    async fn list_with_counts(&self) -> Result<Vec<MenuWithCounts>, RepoError> {
        let state = self.lock();
        let mut menus: Vec<MenuWithCounts> = state
            .menus
            .values()
            .cloned()
            .map(|menu| MenuWithCounts {
                submenus_count: state.submenu_count(menu.id),
                dishes_count: state.dish_count_for_menu(menu.id),
                menu,
            })
            .collect();
        menus.sort_by(|a, b| a.menu.title.cmp(&b.menu.title));
        Ok(menus)
    }

    async fn update(&self, id: Uuid, params: UpdateMenu) -> Result<Option<MenuRecord>, RepoError> {
        let mut state = self.lock();
        if state
            .menus
            .values()
            .any(|m| m.id != id && m.title == params.title)
        {
            return Err(RepoError::Duplicate {
                constraint: "menus_title_key".to_string(),
            });
        }
        Ok(state.menus.get_mut(&id).map(|menu| {
            menu.title = params.title;
            menu.description = params.description;
            menu.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.lock();
        if state.menus.remove(&id).is_none() {
            return Ok(false);
        }
        let submenu_ids: Vec<Uuid> = state
            .submenus
            .values()
            .filter(|s| s.menu_id == id)
            .map(|s| s.id)
            .collect();
        state.submenus.retain(|_, s| s.menu_id != id);
        state
            .dishes
            .retain(|_, d| !submenu_ids.contains(&d.submenu_id));
        Ok(true)
    }

    async fn full_tree(&self) -> Result<Vec<MenuTree>, RepoError> {
        let state = self.lock();
        let mut tree: Vec<MenuTree> = state
            .menus
            .values()
            .cloned()
            .map(|menu| {
                let mut submenus: Vec<SubmenuTree> = state
                    .submenus
                    .values()
                    .filter(|s| s.menu_id == menu.id)
                    .cloned()
                    .map(|submenu| {
                        let mut dishes: Vec<DishRecord> = state
                            .dishes
                            .values()
                            .filter(|d| d.submenu_id == submenu.id)
                            .cloned()
                            .collect();
                        dishes.sort_by(|a, b| a.title.cmp(&b.title));
                        SubmenuTree { submenu, dishes }
                    })
                    .collect();
                submenus.sort_by(|a, b| a.submenu.title.cmp(&b.submenu.title));
                MenuTree { menu, submenus }
            })
            .collect();
        tree.sort_by(|a, b| a.menu.title.cmp(&b.menu.title));
        Ok(tree)
    }
}

#[async_trait]
impl SubmenusRepo for InMemoryCatalog {
    async fn insert(
        &self,
        menu_id: Uuid,
        params: NewSubmenu,
    ) -> Result<SubmenuRecord, RepoError> {
        let mut state = self.lock();
        if state
            .submenus
            .values()
            .any(|s| s.menu_id == menu_id && s.title == params.title)
        {
            return Err(RepoError::Duplicate {
                constraint: "submenus_title_menu_id_key".to_string(),
            });
        }
        let submenu = SubmenuRecord {
            id: Uuid::new_v4(),
            menu_id,
            title: params.title,
            description: params.description,
        };
        state.submenus.insert(submenu.id, submenu.clone());
        Ok(submenu)
    }

    async fn find_by_id(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        Ok(self
            .lock()
            .submenus
            .get(&submenu_id)
            .filter(|s| s.menu_id == menu_id)
            .cloned())
    }

    async fn find_with_counts(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Option<SubmenuWithCounts>, RepoError> {
        let state = self.lock();
        Ok(state
            .submenus
            .get(&submenu_id)
            .filter(|s| s.menu_id == menu_id)
            .cloned()
            .map(|submenu| SubmenuWithCounts {
                dishes_count: state.dish_count_for_submenu(submenu.id),
                submenu,
            }))
    }

    async fn list_with_counts(
        &self,
        menu_id: Uuid,
    ) -> Result<Vec<SubmenuWithCounts>, RepoError> {
        let state = self.lock();
        let mut submenus: Vec<SubmenuWithCounts> = state
            .submenus
            .values()
            .filter(|s| s.menu_id == menu_id)
            .cloned()
            .map(|submenu| SubmenuWithCounts {
                dishes_count: state.dish_count_for_submenu(submenu.id),
                submenu,
            })
            .collect();
        submenus.sort_by(|a, b| a.submenu.title.cmp(&b.submenu.title));
        Ok(submenus)
    }

    async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        params: UpdateSubmenu,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let mut state = self.lock();
        Ok(state
            .submenus
            .get_mut(&submenu_id)
            .filter(|s| s.menu_id == menu_id)
            .map(|submenu| {
                submenu.title = params.title;
                submenu.description = params.description;
                submenu.clone()
            }))
    }

    async fn delete(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.lock();
        let existed = state
            .submenus
            .get(&submenu_id)
            .is_some_and(|s| s.menu_id == menu_id);
        if !existed {
            return Ok(false);
        }
        state.submenus.remove(&submenu_id);
        state.dishes.retain(|_, d| d.submenu_id != submenu_id);
        Ok(true)
    }
}

#[async_trait]
impl DishesRepo for InMemoryCatalog {
    async fn insert(&self, submenu_id: Uuid, params: NewDish) -> Result<DishRecord, RepoError> {
        let mut state = self.lock();
        if state
            .dishes
            .values()
            .any(|d| d.submenu_id == submenu_id && d.title == params.title)
        {
            return Err(RepoError::Duplicate {
                constraint: "dishes_title_key".to_string(),
            });
        }
        let dish = DishRecord {
            id: Uuid::new_v4(),
            submenu_id,
            title: params.title,
            description: params.description,
            price: params.price,
        };
        state.dishes.insert(dish.id, dish.clone());
        Ok(dish)
    }

    async fn find_by_id(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<Option<DishRecord>, RepoError> {
        let state = self.lock();
        let in_path = state
            .submenus
            .get(&submenu_id)
            .is_some_and(|s| s.menu_id == menu_id);
        if !in_path {
            return Ok(None);
        }
        Ok(state
            .dishes
            .get(&dish_id)
            .filter(|d| d.submenu_id == submenu_id)
            .cloned())
    }

    async fn list_by_submenu(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Vec<DishRecord>, RepoError> {
        let state = self.lock();
        let in_path = state
            .submenus
            .get(&submenu_id)
            .is_some_and(|s| s.menu_id == menu_id);
        if !in_path {
            return Ok(Vec::new());
        }
        let mut dishes: Vec<DishRecord> = state
            .dishes
            .values()
            .filter(|d| d.submenu_id == submenu_id)
            .cloned()
            .collect();
        dishes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(dishes)
    }

    async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
        params: UpdateDish,
    ) -> Result<Option<DishRecord>, RepoError> {
        let mut state = self.lock();
        let in_path = state
            .submenus
            .get(&submenu_id)
            .is_some_and(|s| s.menu_id == menu_id);
        if !in_path {
            return Ok(None);
        }
        Ok(state
            .dishes
            .get_mut(&dish_id)
            .filter(|d| d.submenu_id == submenu_id)
            .map(|dish| {
                dish.title = params.title;
                dish.description = params.description;
                dish.price = params.price;
                dish.clone()
            }))
    }

    async fn delete(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<bool, RepoError> {
        let mut state = self.lock();
        let in_path = state
            .submenus
            .get(&submenu_id)
            .is_some_and(|s| s.menu_id == menu_id);
        let existed = in_path
            && state
                .dishes
                .get(&dish_id)
                .is_some_and(|d| d.submenu_id == submenu_id);
        if existed {
            state.dishes.remove(&dish_id);
        }
        Ok(existed)
    }
}

/// Cache store that refuses every operation; requests must still succeed
/// on repository data alone.
pub struct OfflineStore;

#[async_trait]
impl CacheStore for OfflineStore {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: Bytes) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn delete(&self, _keys: &[String]) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }
}

/// The full service stack over one in-memory catalog and one store.
pub struct Stack {
    pub catalog: InMemoryCatalog,
    pub store: Arc<MemoryStore>,
    pub menus: Arc<MenuService>,
    pub submenus: Arc<SubmenuService>,
    pub dishes: Arc<DishService>,
}

impl Stack {
    pub fn sync(&self) -> CatalogSync {
        CatalogSync::new(self.menus.clone(), self.submenus.clone(), self.dishes.clone())
    }
}

pub fn stack() -> Stack {
    let config = CacheConfig::default();
    let store = Arc::new(MemoryStore::new(&config));
    let (menus, submenus, dishes, catalog) = services(config, store.clone());
    Stack {
        catalog,
        store,
        menus,
        submenus,
        dishes,
    }
}

/// Services wired to an arbitrary store implementation.
pub fn services(
    config: CacheConfig,
    store: Arc<dyn CacheStore>,
) -> (
    Arc<MenuService>,
    Arc<SubmenuService>,
    Arc<DishService>,
    InMemoryCatalog,
) {
    let catalog = InMemoryCatalog::new();
    let queue = Arc::new(EventQueue::new());
    let consumer = Arc::new(CacheConsumer::new(config, store.clone(), queue.clone()));
    let trigger = Arc::new(CacheTrigger::new(queue, consumer));

    let menus_repo: Arc<dyn MenusRepo> = Arc::new(catalog.clone());
    let submenus_repo: Arc<dyn SubmenusRepo> = Arc::new(catalog.clone());
    let dishes_repo: Arc<dyn DishesRepo> = Arc::new(catalog.clone());

    let menus = Arc::new(MenuService::new(
        menus_repo.clone(),
        store.clone(),
        trigger.clone(),
    ));
    let submenus = Arc::new(SubmenuService::new(
        menus_repo,
        submenus_repo.clone(),
        store.clone(),
        trigger.clone(),
    ));
    let dishes = Arc::new(DishService::new(submenus_repo, dishes_repo, store, trigger));

    (menus, submenus, dishes, catalog)
}
