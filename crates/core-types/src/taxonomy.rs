use serde::{Deserialize, Serialize};

/// Name of the taxonomy item under which a user's custom aggregates live.
pub const CUSTOM_DIMENSIONS_ITEM: &str = "MyCustomDimensions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyFilterItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<TaxonomyFilterItem>,
}

impl TaxonomyFilterItem {
    pub fn is_custom_dimensions(&self) -> bool {
        self.id == CUSTOM_DIMENSIONS_ITEM || self.name == CUSTOM_DIMENSIONS_ITEM
    }

    fn find_by_name(&self, name: &str) -> Option<&TaxonomyFilterItem> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_name(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyFilter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<TaxonomyFilterItem>,
}

impl TaxonomyFilter {
    pub fn find_item(&self, name: &str) -> Option<&TaxonomyFilterItem> {
        self.items.iter().find_map(|i| i.find_by_name(name))
    }

    /// Ids of the custom aggregates defined for this filter, if any.
    pub fn custom_aggregate_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .find(|i| i.is_custom_dimensions())
            .map(|item| item.children.iter().map(|c| c.id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Picks up to `count` member ids for a query without explicit selections.
    ///
    /// Takes the grandchildren of the first regular root when its first child
    /// has children, else that root's children, else the roots themselves.
    /// Custom aggregates from `aggregate_ids` that this filter defines are
    /// appended.
    pub fn default_selection(&self, count: usize, aggregate_ids: &[String]) -> Vec<String> {
        let roots: Vec<&TaxonomyFilterItem> =
            self.items.iter().filter(|i| !i.is_custom_dimensions()).collect();

        let mut chosen: Vec<String> = match roots.first() {
            Some(root) => match root.children.first() {
                Some(child) if !child.children.is_empty() => {
                    child.children.iter().take(count).map(|i| i.id.clone()).collect()
                }
                _ => root.children.iter().take(count).map(|i| i.id.clone()).collect(),
            },
            None => Vec::new(),
        };
        if chosen.is_empty() {
            chosen = roots.iter().take(count).map(|i| i.id.clone()).collect();
        }

        let defined = self.custom_aggregate_ids();
        chosen.extend(
            aggregate_ids
                .iter()
                .filter(|id| defined.contains(&id.as_str()))
                .cloned(),
        );
        chosen
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyFilters {
    #[serde(default)]
    pub filters: Vec<TaxonomyFilter>,
}

impl TaxonomyFilters {
    pub fn filter(&self, name: &str) -> Option<&TaxonomyFilter> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Depth-first lookup of an item id by its display name across all filters.
    pub fn item_id_by_name(&self, name: &str) -> Option<&str> {
        self.filters
            .iter()
            .find_map(|f| f.find_item(name))
            .map(|item| item.id.as_str())
    }

    /// Names of the filters that contain any of the given custom aggregate ids.
    pub fn filters_with_custom_aggregates(&self, aggregate_ids: &[String]) -> Vec<&str> {
        self.filters
            .iter()
            .filter(|f| {
                f.custom_aggregate_ids()
                    .iter()
                    .any(|id| aggregate_ids.iter().any(|a| a == id))
            })
            .map(|f| f.name.as_str())
            .collect()
    }
}
