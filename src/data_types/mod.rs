pub mod drafts;
pub mod legacy_data_types;
pub mod normalized_data_types;
pub mod time_range;
pub mod vocabulary;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{CatalogError, Result},
    schedule::Schedule,
};
use time_range::TimeRange;

/// Opaque record id. Never reused once handed out.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn generate() -> Self {
        EntityId(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canteen {
    pub id: EntityId,
    pub name: String,
    pub busy_periods: Vec<TimeRange>,
    pub with_air_conditioning: bool,
    /// Owned exclusively by this canteen.
    pub stores: Vec<Store>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: EntityId,
    /// Set at creation, never changed.
    pub canteen_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub opening_hours: Schedule,
    pub food_items: Vec<FoodItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub prices: Prices,
    pub description: Option<String>,
    pub category: Option<Category>,
}

/// `special` is not required to be below `normal`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prices {
    pub normal: f64,
    pub special: Option<f64>,
}

impl Prices {
    pub fn new(normal: f64, special: Option<f64>) -> Result<Self> {
        check_price(normal)?;
        if let Some(special) = special {
            check_price(special)?;
        }
        Ok(Prices { normal, special })
    }
}

fn check_price(price: f64) -> Result<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidPrice(price))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Main,
    Side,
    Drink,
    Vegetarian,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Main => "MAIN",
            Category::Side => "SIDE",
            Category::Drink => "DRINK",
            Category::Vegetarian => "VEGETARIAN",
        }
    }

    pub fn parse(text: &str) -> Option<Category> {
        [
            Category::Main,
            Category::Side,
            Category::Drink,
            Category::Vegetarian,
        ]
        .into_iter()
        .find(|category| text.eq_ignore_ascii_case(category.as_str()))
    }
}

/// Anything whose name must be unique within its scope.
pub trait Named {
    fn id(&self) -> &EntityId;
    fn name(&self) -> &str;
}

impl Named for Canteen {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Store {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
