use crate::error::ScenarioError;
use core_types::{
    ColumnSettings, DataSetSettings, DateRangeOptions, SortInfo, SortOrder, UserSettings,
};
use serde_json::{Map, Value};

/// Fluent editor over the user settings of a fetched settings document.
///
/// Edits happen in place; write the document back with
/// `QueryModule::update_settings` to persist them.
pub struct UserSettingsBuilder<'a> {
    settings: &'a mut UserSettings,
}

pub trait ChangeUserSettings {
    fn change_user_settings(&mut self) -> UserSettingsBuilder<'_>;
}

impl ChangeUserSettings for DataSetSettings {
    fn change_user_settings(&mut self) -> UserSettingsBuilder<'_> {
        UserSettingsBuilder::new(&mut self.user_settings)
    }
}

impl<'a> UserSettingsBuilder<'a> {
    pub fn new(settings: &'a mut UserSettings) -> Self {
        Self { settings }
    }

    /// Replaces the sorting with one entry per named column.
    pub fn add_multiple_sorting(
        self,
        column_names: &[String],
        orders: &[SortOrder],
    ) -> Result<Self, ScenarioError> {
        let sorting = sort_infos(&self.settings.columns, column_names, orders)?;
        self.settings.sorting = sorting;
        Ok(self)
    }

    /// Replaces the grouping with one entry per named column.
    pub fn add_multiple_grouping(
        self,
        column_names: &[String],
        orders: &[SortOrder],
    ) -> Result<Self, ScenarioError> {
        let grouping = sort_infos(&self.settings.columns, column_names, orders)?;
        self.settings.grouping = grouping;
        Ok(self)
    }

    /// Sorts by the first visible sortable column that is neither sorted nor grouped yet.
    pub fn add_sorting_to_first_column_with_disabled_sorting(
        self,
        order: SortOrder,
    ) -> Result<Self, ScenarioError> {
        let key = self
            .first_unused_column(|c| c.allow_sorting)
            .ok_or_else(|| ScenarioError::ColumnNotFound("any unsorted sortable column".to_string()))?;
        self.settings.sorting = vec![SortInfo::new(key, order)];
        Ok(self)
    }

    /// Groups by the first visible groupable column that is neither grouped nor sorted yet.
    pub fn add_grouping_to_first_column_with_disabled_grouping(
        self,
        order: SortOrder,
    ) -> Result<Self, ScenarioError> {
        let key = self
            .first_unused_column(|c| c.allow_grouping)
            .ok_or_else(|| ScenarioError::ColumnNotFound("any ungrouped groupable column".to_string()))?;
        self.settings.grouping = vec![SortInfo::new(key, order)];
        Ok(self)
    }

    /// Fixed columns are stored by header text.
    pub fn freeze_first_not_frozen_column(self) -> Result<Self, ScenarioError> {
        let header = self
            .settings
            .columns
            .iter()
            .find(|c| !c.hidden && !self.settings.fixed_columns.contains(&c.header_text))
            .map(|c| c.header_text.clone())
            .ok_or_else(|| ScenarioError::ColumnNotFound("any visible unfrozen column".to_string()))?;
        self.settings.fixed_columns = vec![header];
        Ok(self)
    }

    pub fn change_page_size(self, page_size: u32) -> Self {
        self.settings.page_size = page_size;
        self
    }

    /// Moves the second visible column in front of the first. Hidden
    /// columns keep their relative order after the visible ones.
    pub fn swap_two_first_columns(self) -> Result<Self, ScenarioError> {
        if self.settings.columns.iter().filter(|c| !c.hidden).count() < 2 {
            return Err(ScenarioError::ColumnNotFound("a second visible column".to_string()));
        }
        let (mut visible, hidden): (Vec<_>, Vec<_>) =
            self.settings.columns.drain(..).partition(|c| !c.hidden);
        visible.swap(0, 1);
        self.settings.columns = visible.into_iter().chain(hidden).collect();
        Ok(self)
    }

    pub fn change_export_settings(self, export_settings: Map<String, Value>) -> Self {
        self.settings.export_settings = export_settings;
        self
    }

    pub fn change_number_of_decimals(self, number_of_decimals: u32) -> Self {
        self.settings.number_of_decimals = number_of_decimals;
        self
    }

    pub fn change_date_range(self, date_range: DateRangeOptions) -> Self {
        self.settings.date_range = date_range;
        self
    }

    pub fn change_width_for_first_column(self, width: impl Into<String>) -> Result<Self, ScenarioError> {
        let column = self
            .settings
            .columns
            .iter_mut()
            .find(|c| !c.hidden)
            .ok_or_else(|| ScenarioError::ColumnNotFound("any visible column".to_string()))?;
        column.width = Some(width.into());
        Ok(self)
    }

    fn first_unused_column(&self, allowed: impl Fn(&ColumnSettings) -> bool) -> Option<String> {
        let in_use = |key: &str| {
            self.settings.sorting.iter().any(|s| s.field == key)
                || self.settings.grouping.iter().any(|g| g.field == key)
        };
        self.settings
            .columns
            .iter()
            .find(|c| allowed(c) && !c.hidden && !in_use(&c.key))
            .map(|c| c.key.clone())
    }
}

fn sort_infos(
    columns: &[ColumnSettings],
    column_names: &[String],
    orders: &[SortOrder],
) -> Result<Vec<SortInfo>, ScenarioError> {
    if column_names.len() != orders.len() {
        return Err(ScenarioError::expectation(
            "sort orders per column",
            column_names.len(),
            orders.len(),
        ));
    }
    column_names
        .iter()
        .zip(orders)
        .map(|(name, order)| {
            columns
                .iter()
                .find(|c| &c.header_text == name)
                .map(|c| SortInfo::new(c.key.clone(), *order))
                .ok_or_else(|| ScenarioError::ColumnNotFound(name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{DataSetId, DatasetKind};
    use pretty_assertions::assert_eq;

    fn column(key: &str, header: &str, hidden: bool) -> ColumnSettings {
        ColumnSettings {
            key: key.to_string(),
            header_text: header.to_string(),
            hidden,
            allow_sorting: true,
            allow_grouping: key != "unit",
            width: None,
            extra: Map::new(),
        }
    }

    fn settings() -> DataSetSettings {
        DataSetSettings {
            data_set: DataSetId {
                id: 1,
                kind: DatasetKind::Cube,
            },
            user_settings: UserSettings {
                columns: vec![
                    column("hidden", "Hidden", true),
                    column("geo", "Geography", false),
                    column("unit", "Unit", false),
                    column("concept", "Concept", false),
                ],
                ..Default::default()
            },
            extra: Map::new(),
        }
    }

    fn keys(settings: &DataSetSettings) -> Vec<&str> {
        settings.user_settings.columns.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn multiple_sorting_resolves_header_text_to_keys() {
        let mut settings = settings();
        settings
            .change_user_settings()
            .add_multiple_grouping(&["Geography".to_string()], &[SortOrder::Tree])
            .unwrap()
            .add_multiple_sorting(&["Unit".to_string(), "Concept".to_string()], &[SortOrder::Asc, SortOrder::Desc])
            .unwrap()
            .change_page_size(100);

        let user = &settings.user_settings;
        assert_eq!(user.grouping, vec![SortInfo::new("geo", SortOrder::Tree)]);
        assert_eq!(
            user.sorting,
            vec![SortInfo::new("unit", SortOrder::Asc), SortInfo::new("concept", SortOrder::Desc)]
        );
        assert_eq!(user.page_size, 100);
    }

    #[test]
    fn unknown_column_is_an_error() {
        let mut settings = settings();
        let result = settings
            .change_user_settings()
            .add_multiple_sorting(&["Sector".to_string()], &[SortOrder::Asc]);
        assert!(matches!(result, Err(ScenarioError::ColumnNotFound(name)) if name == "Sector"));
    }

    #[test]
    fn first_free_column_skips_hidden_and_used_ones() {
        let mut settings = settings();
        settings
            .change_user_settings()
            .add_multiple_sorting(&["Geography".to_string()], &[SortOrder::Asc])
            .unwrap()
            .add_grouping_to_first_column_with_disabled_grouping(SortOrder::Desc)
            .unwrap();

        // "unit" does not allow grouping.
        assert_eq!(settings.user_settings.grouping, vec![SortInfo::new("concept", SortOrder::Desc)]);
    }

    #[test]
    fn freezing_and_width_target_visible_columns() {
        let mut settings = settings();
        settings
            .change_user_settings()
            .freeze_first_not_frozen_column()
            .unwrap()
            .change_width_for_first_column("240px")
            .unwrap();

        assert_eq!(settings.user_settings.fixed_columns, vec!["Geography".to_string()]);
        assert_eq!(settings.user_settings.columns[1].width.as_deref(), Some("240px"));
        assert_eq!(settings.user_settings.columns[0].width, None);
    }

    #[test]
    fn swap_moves_second_visible_column_first() {
        let mut settings = settings();
        settings.change_user_settings().swap_two_first_columns().unwrap();
        assert_eq!(keys(&settings), vec!["unit", "geo", "concept", "hidden"]);
    }

    #[test]
    fn swap_needs_two_visible_columns() {
        let mut settings = settings();
        settings.user_settings.columns.truncate(2);
        assert!(settings.change_user_settings().swap_two_first_columns().is_err());
        assert_eq!(keys(&settings), vec!["hidden", "geo"]);
    }
}
