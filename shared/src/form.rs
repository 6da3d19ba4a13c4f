use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::address_store::{AddressRecord, AddressStore, StoreError};
use crate::event::{AddressId, Category, Coordinate};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("house/flat number is required")]
    MissingHouseNumber,

    #[error("area/road is required")]
    MissingArea,

    #[error("category is required")]
    MissingCategory,

    #[error("category must be Home or Office, got {0:?}")]
    InvalidCategory(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Whether the next submit creates a record or overwrites one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FormMode {
    #[default]
    Creating,
    Editing(AddressId),
}

/// Buffer fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAddress {
    pub house_number: String,
    pub area: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Created(AddressId),
    Updated(AddressId),
}

/// Transient edit buffer for the address form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub house_number: String,
    pub area: String,
    /// Raw selection from the category picker; empty means unset.
    pub category: String,
    pub is_favorite: bool,
    mode: FormMode,
}

impl AddressForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Editing(_))
    }

    pub fn editing_id(&self) -> Option<&AddressId> {
        match &self.mode {
            FormMode::Editing(id) => Some(id),
            FormMode::Creating => None,
        }
    }

    /// The category picker's current selection, if it names a valid category.
    pub fn selected_category(&self) -> Option<Category> {
        self.category.parse().ok()
    }

    pub fn validate(&self) -> Result<ValidatedAddress, ValidationError> {
        let house_number = self.house_number.trim();
        if house_number.is_empty() {
            return Err(ValidationError::MissingHouseNumber);
        }
        let area = self.area.trim();
        if area.is_empty() {
            return Err(ValidationError::MissingArea);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        let category = self
            .category
            .parse::<Category>()
            .map_err(|e| ValidationError::InvalidCategory(e.0))?;

        Ok(ValidatedAddress {
            house_number: house_number.to_string(),
            area: area.to_string(),
            category,
        })
    }

    /// Loads `record` into the buffer and targets it for the next submit.
    pub fn begin_edit(&mut self, record: &AddressRecord) {
        self.house_number = record.house_number.clone();
        self.area = record.area.clone();
        self.category = record.category.label().to_string();
        self.is_favorite = record.is_favorite;
        self.mode = FormMode::Editing(record.id.clone());
    }

    pub fn cancel_edit(&mut self) {
        self.clear();
    }

    /// Drops the edit target if it is the record being removed.
    pub fn forget(&mut self, id: &AddressId) -> bool {
        if self.editing_id() == Some(id) {
            warn!(%id, "Record under edit was deleted; edit cancelled");
            self.clear();
            true
        } else {
            false
        }
    }

    fn clear(&mut self) {
        self.house_number.clear();
        self.area.clear();
        self.category.clear();
        self.is_favorite = false;
        self.mode = FormMode::Creating;
    }

    /// Validates the buffer and appends or replaces in `store`. On any error
    /// the buffer, the mode and the store are left as they were.
    pub fn submit(
        &mut self,
        store: &mut AddressStore,
        coordinate: Coordinate,
    ) -> Result<Submitted, SubmitError> {
        let valid = self.validate()?;

        let outcome = match &self.mode {
            FormMode::Creating => {
                let id = AddressId::generate();
                store.append(AddressRecord {
                    id: id.clone(),
                    house_number: valid.house_number,
                    area: valid.area,
                    category: valid.category,
                    is_favorite: self.is_favorite,
                    coordinate,
                });
                Submitted::Created(id)
            }
            FormMode::Editing(id) => {
                store.replace(
                    id,
                    AddressRecord {
                        id: id.clone(),
                        house_number: valid.house_number,
                        area: valid.area,
                        category: valid.category,
                        is_favorite: self.is_favorite,
                        coordinate,
                    },
                )?;
                Submitted::Updated(id.clone())
            }
        };

        info!(?outcome, "Address form submitted");
        self.clear();
        Ok(outcome)
    }
}
