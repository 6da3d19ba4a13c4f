use serde::{Deserialize, Serialize};

use crate::address_store::AddressRecord;
use crate::event::{AddressId, Category, Coordinate};
use crate::model::Model;
use crate::resolver::ResolutionStatus;
use crate::AppError;

pub const SEARCH_PLACEHOLDER: &str = "Search for a location";
pub const PERMISSION_MODAL_TITLE: &str = "Location Permission Denied";
pub const SAVE_LABEL: &str = "Save Address";
pub const UPDATE_LABEL: &str = "Update Address";
pub const FAVORITE_GLYPH: &str = "★";
pub const NOT_FAVORITE_GLYPH: &str = "☆";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: f64,
    pub marker: Coordinate,
    /// Needed by the shell to load the map and places widgets.
    pub api_key: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionModalView {
    pub title: String,
    pub message: String,
    pub retry_label: String,
    pub close_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryOption {
    pub category: Category,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormView {
    pub house_number: String,
    pub area: String,
    pub categories: Vec<CategoryOption>,
    pub is_favorite: bool,
    pub is_editing: bool,
    pub submit_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedAddressRow {
    pub id: AddressId,
    /// Position at render time; informational only, rows dispatch by `id`.
    pub index: usize,
    pub title: String,
    pub category_label: String,
    pub is_favorite: bool,
    pub favorite_glyph: String,
    pub is_being_edited: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub map: MapView,
    pub search_placeholder: String,
    pub permission_modal: Option<PermissionModalView>,
    pub form: FormView,
    pub resolved_address: String,
    pub resolution: ResolutionStatus,
    pub is_locating: bool,
    pub can_retry_geocode: bool,
    pub saved: Vec<SavedAddressRow>,
    pub favorite_count: usize,
    pub error: Option<UserFacingError>,
}

fn build_form(model: &Model) -> FormView {
    let selected = model.form.selected_category();
    FormView {
        house_number: model.form.house_number.clone(),
        area: model.form.area.clone(),
        categories: Category::ALL
            .into_iter()
            .map(|category| CategoryOption {
                category,
                label: category.label().to_string(),
                selected: selected == Some(category),
            })
            .collect(),
        is_favorite: model.form.is_favorite,
        is_editing: model.form.is_editing(),
        submit_label: if model.form.is_editing() {
            UPDATE_LABEL
        } else {
            SAVE_LABEL
        }
        .to_string(),
    }
}

fn build_row(index: usize, record: &AddressRecord, editing: Option<&AddressId>) -> SavedAddressRow {
    SavedAddressRow {
        id: record.id.clone(),
        index,
        title: record.title(),
        category_label: format!("Category: {}", record.category),
        is_favorite: record.is_favorite,
        favorite_glyph: if record.is_favorite {
            FAVORITE_GLYPH
        } else {
            NOT_FAVORITE_GLYPH
        }
        .to_string(),
        is_being_edited: editing == Some(&record.id),
    }
}

fn build_permission_modal(model: &Model) -> Option<PermissionModalView> {
    let error = AppError::from(model.resolver.denied()?);
    Some(PermissionModalView {
        title: PERMISSION_MODAL_TITLE.into(),
        message: error.user_facing_message(),
        retry_label: "Enable Location".into(),
        close_label: "Close".into(),
    })
}

impl ViewModel {
    #[must_use]
    pub fn build(model: &Model) -> Self {
        let editing = model.form.editing_id();
        Self {
            map: MapView {
                center: model.marker,
                zoom: model.map_zoom.value(),
                marker: model.marker,
                api_key: model
                    .settings
                    .api_key
                    .as_ref()
                    .map(|k| k.expose().to_string()),
            },
            search_placeholder: SEARCH_PLACEHOLDER.into(),
            permission_modal: build_permission_modal(model),
            form: build_form(model),
            resolved_address: model.resolver.resolved_address().to_string(),
            resolution: model.resolver.status().clone(),
            is_locating: model.resolver.is_locating(),
            can_retry_geocode: model.resolver.retry_target().is_some(),
            saved: model
                .store
                .iter()
                .enumerate()
                .map(|(index, record)| build_row(index, record, editing))
                .collect(),
            favorite_count: model.store.favorites().count(),
            error: model.active_error.as_ref().map(UserFacingError::from),
        }
    }
}
