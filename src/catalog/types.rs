//! Catalog payload types
//!
//! These mirror the JSON returned by the catalog API. Only the fields the
//! walker reads are decoded; everything else stays in its raw JSON form so an
//! enriched tree serializes back to the input schema plus the derived
//! statistics. A field missing from the input stays missing in the output and
//! an explicit `null` stays `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque category identifier as it appears on the wire
pub type CategoryId = Value;

const ID: &str = "id";
const SOLD_COUNT: &str = "soldCount";
const COUNTRY_OF_ORIGIN: &str = "countryOfOrigin";

/// Identifier used when a payload has no `id` field
static ABSENT_ID: CategoryId = Value::Null;

/// Render an identifier for URLs, file names and logs.
///
/// Strings are used verbatim (no surrounding quotes), anything else is
/// rendered as compact JSON.
pub fn display_id(id: &CategoryId) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The `id` entry of a raw category object
pub(crate) fn id_field(fields: &Map<String, Value>) -> &CategoryId {
    fields.get(ID).unwrap_or(&ABSENT_ID)
}

/// One node of the category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Items in this category and all of its descendants
    pub count: i64,

    /// Child categories; `None` when the payload had no `subCategories`
    #[serde(
        rename = "subCategories",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_categories: Option<Vec<Category>>,

    /// Derived statistics; `None` until the walker has enriched this node
    #[serde(flatten)]
    pub stats: Option<CategoryStats>,

    /// Pass-through fields, `id` and `name` included
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    /// Create a bare category (mostly useful for tests and fixtures)
    pub fn new(id: impl Into<CategoryId>, count: i64, sub_categories: Vec<Category>) -> Self {
        let mut extra = Map::new();
        extra.insert(ID.to_string(), id.into());

        Self {
            count,
            sub_categories: Some(sub_categories),
            stats: None,
            extra,
        }
    }

    /// The category's identifier (`null` if the payload had none)
    pub fn id(&self) -> &CategoryId {
        id_field(&self.extra)
    }

    pub fn children(&self) -> &[Category] {
        self.sub_categories.as_deref().unwrap_or_default()
    }

    /// Sum of the direct children's subtree counts, saturating at the `i64`
    /// bounds
    pub fn children_count(&self) -> i64 {
        self.children()
            .iter()
            .fold(0i64, |sum, c| sum.saturating_add(c.count))
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Category::node_count)
            .sum::<usize>()
    }

    /// Iterate the subtree in pre-order (this node first, then each child's
    /// subtree in order)
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// True once every node of the subtree carries statistics
    pub fn is_enriched(&self) -> bool {
        self.iter().all(|c| c.stats.is_some())
    }
}

/// Pre-order iterator over a category subtree
pub struct PreOrder<'a> {
    stack: Vec<&'a Category>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Category;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Statistics derived for a single category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// Items directly in this category (excluding descendants)
    pub count_own: i64,

    /// Best sellers, highest `soldCount` first
    pub top_products: Vec<Product>,

    /// Share of products from the target origin, 0-100
    pub origin_percentage: u32,
}

/// One catalog item
///
/// Keeps the raw JSON object and decodes `soldCount` and `countryOfOrigin`
/// from it once. Serializing writes the raw object back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Product {
    sold_count: i64,
    country_of_origin: Option<String>,
    fields: Map<String, Value>,
}

impl Product {
    pub fn new(id: impl Into<Value>, sold_count: i64, country_of_origin: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert(ID.to_string(), id.into());
        fields.insert(SOLD_COUNT.to_string(), Value::from(sold_count));
        if let Some(code) = country_of_origin {
            fields.insert(COUNTRY_OF_ORIGIN.to_string(), Value::from(code));
        }

        Self {
            sold_count,
            country_of_origin: country_of_origin.map(str::to_string),
            fields,
        }
    }

    /// The product's identifier (`null` if the payload had none)
    pub fn id(&self) -> &Value {
        self.fields.get(ID).unwrap_or(&ABSENT_ID)
    }

    /// Units sold; a missing or `null` `soldCount` counts as 0
    pub fn sold_count(&self) -> i64 {
        self.sold_count
    }

    /// Country code; `None` means unknown
    pub fn country_of_origin(&self) -> Option<&str> {
        self.country_of_origin.as_deref()
    }

    /// The raw JSON object
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for Product {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let sold_count = match fields.get(SOLD_COUNT) {
            None | Some(Value::Null) => 0,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| format!("soldCount must be an integer, got {}", value))?,
        };

        let country_of_origin = match fields.get(COUNTRY_OF_ORIGIN) {
            None | Some(Value::Null) => None,
            Some(Value::String(code)) => Some(code.clone()),
            Some(other) => {
                return Err(format!(
                    "countryOfOrigin must be a string or null, got {}",
                    other
                ))
            }
        };

        Ok(Self {
            sold_count,
            country_of_origin,
            fields,
        })
    }
}

impl From<Product> for Map<String, Value> {
    fn from(product: Product) -> Self {
        product.fields
    }
}
