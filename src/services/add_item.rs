use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::catalog::Catalog;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{Item, LookupResult, NewItem};
use crate::services::lookup::UpcLookupClient;
use crate::storage::ItemStore;

/// Submitted add-item form. Every field is required; string fields are
/// rejected when blank after trimming. Defaults keep partial payloads inside
/// the field-keyed validation instead of failing JSON extraction.
#[derive(Clone, Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemForm {
    #[serde(default)]
    #[validate(custom = "validate_barcode")]
    pub barcode: String,
    #[serde(default)]
    #[validate(custom = "validate_name")]
    pub name: String,
    #[serde(default)]
    #[validate(custom = "validate_supplier")]
    pub supplier: String,
    #[serde(default)]
    #[validate(custom = "validate_image_url")]
    pub image_url: String,
    #[serde(default)]
    #[validate(
        required(message = "Nabavna cijena mora biti veća od 0"),
        custom = "validate_purchase_price"
    )]
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    #[validate(
        required(message = "Količina mora biti 0 ili veća"),
        range(min = 0, message = "Količina mora biti 0 ili veća")
    )]
    pub quantity: Option<i32>,
    #[serde(default)]
    #[validate(custom = "validate_category")]
    pub category_id: String,
    #[serde(default)]
    #[validate(custom = "validate_subcategory")]
    pub subcategory_id: String,
}

fn required_text(value: &str, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        return Err(error);
    }
    Ok(())
}

fn validate_barcode(value: &str) -> Result<(), ValidationError> {
    required_text(value, "required", "Barkod je obavezan")
}

fn validate_name(value: &str) -> Result<(), ValidationError> {
    required_text(value, "required", "Naziv je obavezan")
}

fn validate_supplier(value: &str) -> Result<(), ValidationError> {
    required_text(value, "required", "Dobavljač je obavezan")
}

fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    required_text(value, "required", "URL slike je obavezan")
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    required_text(value, "required", "Kategorija je obavezna")
}

fn validate_subcategory(value: &str) -> Result<(), ValidationError> {
    required_text(value, "required", "Potkategorija je obavezna")
}

fn validate_purchase_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.message = Some("Nabavna cijena mora biti veća od 0".into());
        return Err(error);
    }
    Ok(())
}

impl AddItemForm {
    /// Field checks plus the catalog reference checks. The parentage check
    /// only fires once the category itself passed, so one broken field
    /// reports one error.
    pub fn validate_against(&self, catalog: &Catalog) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let category_id = self.category_id.trim();
        let subcategory_id = self.subcategory_id.trim();

        if !category_id.is_empty() && !catalog.has_category(category_id) {
            let mut error = ValidationError::new("unknown_category");
            error.message = Some("Nepoznata kategorija".into());
            errors.add("category_id", error);
        }

        if !subcategory_id.is_empty()
            && !errors.errors().contains_key("category_id")
            && !catalog.subcategory_belongs_to(subcategory_id, category_id)
        {
            let mut error = ValidationError::new("subcategory_mismatch");
            error.message = Some("Potkategorija ne pripada odabranoj kategoriji".into());
            errors.add("subcategory_id", error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn to_new_item(&self, quantity: i32) -> NewItem {
        NewItem {
            barcode: self.barcode.trim().to_string(),
            name: self.name.trim().to_string(),
            supplier: self.supplier.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            purchase_price: self.purchase_price.unwrap_or_default(),
            quantity,
            category_id: self.category_id.trim().to_string(),
            subcategory_id: self.subcategory_id.trim().to_string(),
        }
    }
}

/// Where the prefill data came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrefillSource {
    Store,
    Lookup,
    None,
}

/// Prefill answer for a scanned barcode. `item` is set when the barcode is
/// already in the store, `lookup` when the UPC database knew it; with
/// neither set the notice explains why.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrefillResponse {
    pub source: PrefillSource,
    pub notice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupResult>,
}

impl PrefillResponse {
    fn from_store(item: Item) -> Self {
        Self {
            source: PrefillSource::Store,
            notice: "Artikal već postoji – podaci su učitani iz baze".to_string(),
            item: Some(item),
            lookup: None,
        }
    }

    fn from_lookup(result: LookupResult) -> Self {
        Self {
            source: PrefillSource::Lookup,
            notice: "Podaci preuzeti sa UPC servisa".to_string(),
            item: None,
            lookup: Some(result),
        }
    }

    fn miss() -> Self {
        Self {
            source: PrefillSource::None,
            notice: "Nije moguće preuzeti podatke za ovaj barkod".to_string(),
            item: None,
            lookup: None,
        }
    }

    fn lookup_failed() -> Self {
        Self {
            source: PrefillSource::None,
            notice: "Greška prilikom preuzimanja podataka".to_string(),
            item: None,
            lookup: None,
        }
    }
}

/// What a submit did to the store.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Created(Item),
    Restocked { item: Item, added: i32 },
}

impl SubmitOutcome {
    pub fn item(&self) -> &Item {
        match self {
            SubmitOutcome::Created(item) => item,
            SubmitOutcome::Restocked { item, .. } => item,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SubmitOutcome::Created(_))
    }

    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Created(_) => "Artikal uspješno dodat".to_string(),
            SubmitOutcome::Restocked { item, added } => {
                format!("Dodano {} kom. Nova količina: {}", added, item.quantity)
            }
        }
    }
}

/// The add-item workflow: prefill a form for a scanned barcode, then apply
/// the submitted form as a create or an additive restock.
#[derive(Clone)]
pub struct AddItemService {
    store: Arc<dyn ItemStore>,
    lookup: UpcLookupClient,
    catalog: Arc<Catalog>,
    event_sender: EventSender,
}

impl AddItemService {
    pub fn new(
        store: Arc<dyn ItemStore>,
        lookup: UpcLookupClient,
        catalog: Arc<Catalog>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            store,
            lookup,
            catalog,
            event_sender,
        }
    }

    /// Store first, then the UPC database. A lookup failure turns into a
    /// notice rather than an error; the form stays open for manual entry.
    #[instrument(skip(self))]
    pub async fn prefill(&self, barcode: &str) -> Result<PrefillResponse, ServiceError> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(ServiceError::ValidationError("Unesite barkod".to_string()));
        }

        if let Some(item) = self.store.find_by_barcode(barcode).await? {
            return Ok(PrefillResponse::from_store(item));
        }

        match self.lookup.lookup(barcode).await {
            Ok(Some(result)) => {
                self.notify_lookup(barcode, true).await;
                Ok(PrefillResponse::from_lookup(result))
            }
            Ok(None) => {
                self.notify_lookup(barcode, false).await;
                Ok(PrefillResponse::miss())
            }
            Err(e) => {
                warn!("UPC lookup failed for {}: {}", barcode, e);
                Ok(PrefillResponse::lookup_failed())
            }
        }
    }

    /// Validates the form, then re-checks the store for the barcode: a hit
    /// merges (quantity is added, the other fields are overwritten), a miss
    /// creates. The re-check happens at submit time because the form may
    /// have been edited since the prefill.
    #[instrument(skip(self, form), fields(barcode = %form.barcode))]
    pub async fn submit(&self, form: AddItemForm) -> Result<SubmitOutcome, ServiceError> {
        form.validate_against(&self.catalog)?;

        let barcode = form.barcode.trim().to_string();
        let quantity = form.quantity.unwrap_or_default();

        match self.store.find_by_barcode(&barcode).await? {
            Some(existing) => {
                // A restock always moves stock: zero on the form still adds one.
                let added = quantity.max(1);

                let mut merged = existing;
                let form_fields = form.to_new_item(0);
                merged.name = form_fields.name;
                merged.supplier = form_fields.supplier;
                merged.image_url = form_fields.image_url;
                merged.purchase_price = form_fields.purchase_price;
                merged.category_id = form_fields.category_id;
                merged.subcategory_id = form_fields.subcategory_id;
                merged.quantity += added;

                let item = self.store.update(merged).await.map_err(|err| match err {
                    ServiceError::Conflict(_) => err,
                    err => {
                        error!("Restock update failed for {}: {}", barcode, err);
                        ServiceError::ServiceUnavailable(
                            "Greška pri ažuriranju artikla".to_string(),
                        )
                    }
                })?;

                self.event_sender
                    .send(Event::ItemRestocked {
                        item_id: item.id.clone(),
                        barcode: item.barcode.clone(),
                        added,
                        quantity: item.quantity,
                    })
                    .await
                    .map_err(|e| {
                        error!("Failed to send ItemRestocked event: {}", e);
                        ServiceError::EventError(e)
                    })?;

                Ok(SubmitOutcome::Restocked { item, added })
            }
            None => {
                let item = self
                    .store
                    .insert(form.to_new_item(quantity))
                    .await
                    .map_err(|err| match err {
                        ServiceError::Conflict(_) => err,
                        err => {
                            error!("Insert failed for {}: {}", barcode, err);
                            ServiceError::ServiceUnavailable(
                                "Greška prilikom dodavanja artikla u bazu".to_string(),
                            )
                        }
                    })?;

                self.event_sender
                    .send(Event::ItemCreated {
                        item_id: item.id.clone(),
                        barcode: item.barcode.clone(),
                    })
                    .await
                    .map_err(|e| {
                        error!("Failed to send ItemCreated event: {}", e);
                        ServiceError::EventError(e)
                    })?;

                Ok(SubmitOutcome::Created(item))
            }
        }
    }

    async fn notify_lookup(&self, barcode: &str, found: bool) {
        if let Err(e) = self
            .event_sender
            .send(Event::LookupServed {
                barcode: barcode.to_string(),
                found,
            })
            .await
        {
            error!("Failed to send LookupServed event: {}", e);
        }
    }
}
