use std::{cell::Cell, fs, io, path::Path, rc::Rc};

use canteen_catalog_rs::{
    catalog_operations::{Catalog, Change},
    data_backend::RawSnapshot,
    data_types::{
        drafts::{CanteenDraft, FoodItemDraft, StoreDraft},
        time_range::TimeRange,
        vocabulary::{Day, Frequency},
        EntityId,
    },
    db_operations::SqliteStore,
    errors::{CatalogError, StorageError},
    file_operations::JsonFileStore,
    session::{CatalogPersistence, Session},
};
use chrono::NaiveDate;

const LEGACY_FILE: &str = r#"[
    {
        "id": 1,
        "canteen_name": "โรงอาหาร C10",
        "busy_hours": { "start_time": "11:00", "end_time": "13:00" },
        "with_airconditioning": true,
        "stores": [
            {
                "name": "ร้านก๋วยเตี๋ยว",
                "opening_hours": {
                    "frequency": "เฉพาะบางวัน",
                    "days": {
                        "จันทร์": { "start_time": "07:00", "end_time": "14:00" },
                        "พุธ": { "start_time": "08:00", "end_time": "15:00" }
                    }
                },
                "food_items": [
                    { "name": "เส้นเล็กน้ำใส", "prices": { "normal": 45, "special": 55 } }
                ]
            }
        ]
    }
]"#;

fn file_session(path: &Path) -> Session<JsonFileStore> {
    Session::new(JsonFileStore::new(path))
}

fn named_canteen(name: &str) -> CanteenDraft {
    CanteenDraft {
        name: name.to_string(),
        ..CanteenDraft::default()
    }
}

fn food(name: &str, normal: f64, special: Option<f64>) -> FoodItemDraft {
    FoodItemDraft {
        name: name.to_string(),
        normal_price: normal,
        special_price: special,
        ..FoodItemDraft::default()
    }
}

/// Delegates to a file store until switched off.
struct FlakyStore {
    inner: JsonFileStore,
    down: Rc<Cell<bool>>,
}

impl FlakyStore {
    fn check(&self) -> Result<(), StorageError> {
        if self.down.get() {
            return Err(io::Error::new(io::ErrorKind::Other, "disk unplugged").into());
        }
        Ok(())
    }
}

impl CatalogPersistence for FlakyStore {
    fn load_snapshot(&mut self) -> Result<RawSnapshot, StorageError> {
        self.check()?;
        self.inner.load_snapshot()
    }

    fn apply(&mut self, catalog: &Catalog, changes: &[Change]) -> Result<(), StorageError> {
        self.check()?;
        self.inner.apply(catalog, changes)
    }

    fn replace_all(&mut self, catalog: &Catalog) -> Result<(), StorageError> {
        self.check()?;
        self.inner.replace_all(catalog)
    }
}

#[test]
fn added_canteen_is_listed_once_with_an_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canteen_data.json");
    let mut session = file_session(&path);

    let lunch: TimeRange = "11:00-13:00".parse().unwrap();
    let id = session
        .add_canteen(CanteenDraft {
            name: "C10".to_string(),
            busy_periods: vec![lunch],
            with_air_conditioning: true,
        })
        .unwrap();

    let catalog = session.load().unwrap();
    let matching: Vec<_> = catalog
        .canteens()
        .iter()
        .filter(|canteen| canteen.name == "C10")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, id);
    assert_eq!(matching[0].busy_periods, vec![lunch]);
    assert!(matching[0].with_air_conditioning);
    assert!(!id.as_str().is_empty());

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"canteen_name\": \"C10\""));
    assert!(text.contains("\"with_airconditioning\": true"));
}

#[test]
fn everyday_store_is_open_all_week() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = file_session(&dir.path().join("canteen_data.json"));
    let canteen_id = session.add_canteen(named_canteen("C10")).unwrap();

    let store_id = session
        .add_store(
            &canteen_id,
            StoreDraft {
                name: "Noodle Shop".to_string(),
                ..StoreDraft::default()
            },
        )
        .unwrap();

    let catalog = session.load().unwrap();
    let resolved = catalog.store(&store_id).unwrap().opening_hours.resolve();
    assert_eq!(resolved.len(), 7);
    for day in Day::ALL {
        assert_eq!(resolved[&day].to_string(), "07:00-16:00");
    }
}

#[test]
fn deleting_a_store_drops_its_menu() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canteen_data.json");
    let mut session = file_session(&path);
    let canteen_id = session.add_canteen(named_canteen("C10")).unwrap();
    let store_id = session
        .add_store(
            &canteen_id,
            StoreDraft {
                name: "Rice Corner".to_string(),
                ..StoreDraft::default()
            },
        )
        .unwrap();
    for name in ["Khao Man Gai", "Khao Mok", "Khao Kha Mu"] {
        session.add_food_item(&store_id, food(name, 45.0, None)).unwrap();
    }

    let removed = session.delete_store(&store_id).unwrap();
    assert_eq!(removed.food_items.len(), 3);

    let catalog = session.load().unwrap();
    assert!(catalog.canteen(&canteen_id).unwrap().stores.is_empty());
    assert!(!fs::read_to_string(&path).unwrap().contains("Khao Mok"));
}

#[test]
fn removing_special_price_removes_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canteen_data.json");
    let mut session = file_session(&path);
    let canteen_id = session.add_canteen(named_canteen("C10")).unwrap();
    let store_id = session
        .add_store(
            &canteen_id,
            StoreDraft {
                name: "Thai Kitchen".to_string(),
                ..StoreDraft::default()
            },
        )
        .unwrap();
    session
        .add_food_item(&store_id, food("Pad Thai", 50.0, Some(60.0)))
        .unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("\"special\": 60.0"));

    session
        .edit_food_item(&store_id, 0, food("Pad Thai", 50.0, None))
        .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"normal\": 50.0"));
    assert!(!text.contains("\"special\""));
}

#[test]
fn duplicate_name_leaves_the_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canteen_data.json");
    let mut session = file_session(&path);
    session.add_canteen(named_canteen("Food Court")).unwrap();
    let before = fs::read(&path).unwrap();

    let err = session.add_canteen(named_canteen("food court")).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateName { .. }));
    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!session.is_halted());
}

#[test]
fn legacy_file_with_thai_labels_loads_and_keeps_its_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canteen_data.json");
    fs::write(&path, LEGACY_FILE).unwrap();
    let mut session = file_session(&path);

    let catalog = session.load().unwrap();
    let canteen = &catalog.canteens()[0];
    assert_eq!(canteen.id, EntityId::from("1"));
    assert!(canteen.with_air_conditioning);
    assert_eq!(canteen.busy_periods[0].to_string(), "11:00-13:00");

    let store = &canteen.stores[0];
    assert_eq!(store.opening_hours.frequency(), Frequency::SpecificDays);
    let resolved = store.opening_hours.resolve();
    assert_eq!(resolved.keys().copied().collect::<Vec<_>>(), [Day::Monday, Day::Wednesday]);
    assert_eq!(store.food_items[0].prices.special, Some(55.0));

    // any write keeps Thai keys and raw UTF-8
    let mut draft = CanteenDraft::for_edit(canteen);
    draft.with_air_conditioning = false;
    session.edit_canteen(&canteen.id, draft).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"เฉพาะบางวัน\""));
    assert!(text.contains("\"จันทร์\""));
    assert!(text.contains("\"with_airconditioning\": false"));
}

#[test]
fn date_range_store_is_closed_outside_its_window() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = file_session(&dir.path().join("canteen_data.json"));
    let canteen_id = session.add_canteen(named_canteen("C10")).unwrap();

    let mut draft = StoreDraft {
        name: "Exam Week Cafe".to_string(),
        frequency: Frequency::DateRange,
        start_date: NaiveDate::from_ymd_opt(2024, 5, 6),
        end_date: NaiveDate::from_ymd_opt(2024, 5, 12),
        ..StoreDraft::default()
    };
    for day in Day::ALL {
        draft = draft.with_day(day, "08:00-20:00".parse().unwrap());
    }
    let store_id = session.add_store(&canteen_id, draft).unwrap();

    let catalog = session.load().unwrap();
    let hours = &catalog.store(&store_id).unwrap().opening_hours;
    let inside = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
    let outside = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    assert_eq!(hours.hours_on(inside).unwrap().to_string(), "08:00-20:00");
    assert_eq!(hours.hours_on(outside), None);
}

#[test]
fn storage_failure_halts_until_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let down = Rc::new(Cell::new(false));
    let mut session = Session::new(FlakyStore {
        inner: JsonFileStore::new(dir.path().join("canteen_data.json")),
        down: Rc::clone(&down),
    });
    session.add_canteen(named_canteen("C10")).unwrap();

    down.set(true);
    assert!(matches!(
        session.add_canteen(named_canteen("C11")),
        Err(CatalogError::Storage(_))
    ));
    assert!(session.is_halted());

    // storage is back, but the session stays halted until asked to reconnect
    down.set(false);
    assert!(matches!(
        session.add_canteen(named_canteen("C11")),
        Err(CatalogError::SessionHalted)
    ));

    session.reconnect().unwrap();
    assert!(!session.is_halted());
    session.add_canteen(named_canteen("C11")).unwrap();
    assert_eq!(session.load().unwrap().canteens().len(), 2);
}

#[test]
fn migrate_file_catalog_into_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canteen_data.json");
    fs::write(&path, LEGACY_FILE).unwrap();
    let mut file = file_session(&path);

    let mut db = SqliteStore::open(dir.path().join("canteen.sqlite")).unwrap();
    assert_eq!(file.migrate_to(&mut db).unwrap(), 1);

    let expected = file.load().unwrap();
    let mut db_session = Session::new(db);
    assert_eq!(db_session.load().unwrap().canteens(), expected.canteens());
}

#[test]
fn database_canteen_delete_leaves_purgeable_orphans() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(SqliteStore::open(dir.path().join("canteen.sqlite")).unwrap());
    let canteen_id = session.add_canteen(named_canteen("C10")).unwrap();
    let store_id = session
        .add_store(
            &canteen_id,
            StoreDraft {
                name: "Noodle Shop".to_string(),
                ..StoreDraft::default()
            },
        )
        .unwrap();

    session.delete_canteen(&canteen_id).unwrap();
    let catalog = session.load().unwrap();
    assert!(catalog.canteens().is_empty());
    assert_eq!(catalog.orphaned_stores()[0].id, store_id);

    assert_eq!(session.purge_orphaned_stores().unwrap(), 1);
    assert!(session.load().unwrap().orphaned_stores().is_empty());
}

#[test]
fn every_other_day_store_keeps_its_flag_in_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(SqliteStore::open(dir.path().join("canteen.sqlite")).unwrap());
    let canteen_id = session.add_canteen(named_canteen("C10")).unwrap();
    let store_id = session
        .add_store(
            &canteen_id,
            StoreDraft {
                name: "Juice Bar".to_string(),
                frequency: Frequency::EveryOtherDay,
                ..StoreDraft::default()
            },
        )
        .unwrap();

    let catalog = session.load().unwrap();
    let hours = &catalog.store(&store_id).unwrap().opening_hours;
    assert_eq!(hours.frequency(), Frequency::EveryOtherDay);
    assert_eq!(hours.resolve().len(), 7);

    // an unrelated edit rewrites the row and must not lose the flag either
    let mut draft = StoreDraft::for_edit(catalog.store(&store_id).unwrap());
    draft.description = Some("fresh every morning".to_string());
    session.edit_store(&store_id, draft).unwrap();
    let catalog = session.load().unwrap();
    assert_eq!(
        catalog.store(&store_id).unwrap().opening_hours.frequency(),
        Frequency::EveryOtherDay
    );
}
