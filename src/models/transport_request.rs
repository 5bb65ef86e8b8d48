use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::{
    error::{AppError, Result},
    models::fields::{
        date_field, decimal_column, decode_stored, fallback_service_types, non_negative,
        optional_text, to_two_places, FieldCheck, JsonField, ServicePrices, ServiceTypes,
    },
};

/// Lifecycle state of a transport request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Approved and Rejected admit no further transition.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// Admin decision on a pending request, parsed from the lower-case token
/// the status endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl FromStr for Decision {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approved" => Ok(Decision::Approved),
            "rejected" => Ok(Decision::Rejected),
            _ => Err(AppError::InvalidStatus),
        }
    }
}

impl From<Decision> for RequestStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// Stored transport request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequest {
    pub id: i64,
    pub customer_id: i64,
    pub vehicle_type: String,
    pub vehicle_size: String,
    pub consignee: String,
    pub consigner: String,
    pub containers_20ft: i32,
    pub containers_40ft: i32,
    pub total_containers: i32,
    pub pickup_location: String,
    pub stuffing_location: Option<String>,
    pub delivery_location: String,
    pub commodity: String,
    pub cargo_type: String,
    pub cargo_weight: Decimal,
    pub service_type: ServiceTypes,
    pub service_prices: ServicePrices,
    pub expected_pickup_date: NaiveDate,
    pub expected_delivery_date: NaiveDate,
    pub requested_price: Decimal,
    pub status: RequestStatus,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for TransportRequest {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let service_type: String = row.try_get("service_type")?;
        let service_prices: String = row.try_get("service_prices")?;

        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            vehicle_type: row.try_get("vehicle_type")?,
            vehicle_size: row.try_get("vehicle_size")?,
            consignee: row.try_get("consignee")?,
            consigner: row.try_get("consigner")?,
            containers_20ft: row.try_get("containers_20ft")?,
            containers_40ft: row.try_get("containers_40ft")?,
            total_containers: row.try_get("total_containers")?,
            pickup_location: row.try_get("pickup_location")?,
            stuffing_location: row.try_get("stuffing_location")?,
            delivery_location: row.try_get("delivery_location")?,
            commodity: row.try_get("commodity")?,
            cargo_type: row.try_get("cargo_type")?,
            cargo_weight: decimal_column(row, "cargo_weight")?,
            service_type: decode_stored("service_type", &service_type),
            service_prices: decode_stored("service_prices", &service_prices),
            expected_pickup_date: row.try_get("expected_pickup_date")?,
            expected_delivery_date: row.try_get("expected_delivery_date")?,
            requested_price: decimal_column(row, "requested_price")?,
            status: row.try_get("status")?,
            admin_comment: row.try_get("admin_comment")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Request row joined with its owner, for the admin listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequestWithCustomer {
    #[serde(flatten)]
    pub request: TransportRequest,
    pub customer_name: String,
    pub customer_email: String,
}

impl<'r> FromRow<'r, SqliteRow> for TransportRequestWithCustomer {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            request: TransportRequest::from_row(row)?,
            customer_name: row.try_get("customer_name")?,
            customer_email: row.try_get("customer_email")?,
        })
    }
}

/// Create/update payload as sent by the client. Older clients send
/// snake_case keys, so each field also answers to that spelling.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestFields {
    #[serde(alias = "vehicle_type")]
    pub vehicle_type: Option<String>,
    #[serde(alias = "vehicle_size")]
    pub vehicle_size: Option<String>,
    pub consignee: Option<String>,
    pub consigner: Option<String>,
    #[serde(alias = "containers_20ft")]
    pub containers_20ft: Option<i32>,
    #[serde(alias = "containers_40ft")]
    pub containers_40ft: Option<i32>,
    #[serde(alias = "total_containers")]
    pub total_containers: Option<i32>,
    #[serde(alias = "pickup_location")]
    pub pickup_location: Option<String>,
    #[serde(alias = "stuffing_location")]
    pub stuffing_location: Option<String>,
    #[serde(alias = "delivery_location")]
    pub delivery_location: Option<String>,
    pub commodity: Option<String>,
    #[serde(alias = "cargo_type")]
    pub cargo_type: Option<String>,
    #[serde(alias = "cargo_weight")]
    pub cargo_weight: Option<Decimal>,
    #[serde(alias = "service_type")]
    pub service_type: Option<JsonField<ServiceTypes>>,
    #[serde(alias = "service_prices")]
    pub service_prices: Option<JsonField<ServicePrices>>,
    #[serde(alias = "expected_pickup_date")]
    pub expected_pickup_date: Option<String>,
    #[serde(alias = "expected_delivery_date")]
    pub expected_delivery_date: Option<String>,
    #[serde(alias = "requested_price")]
    pub requested_price: Option<Decimal>,
    /// Accepted for compatibility with older clients and ignored: the
    /// lifecycle alone decides the status.
    pub status: Option<String>,
}

/// Validated scalar fields of a request, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    pub vehicle_type: String,
    pub vehicle_size: String,
    pub consignee: String,
    pub consigner: String,
    pub containers_20ft: i32,
    pub containers_40ft: i32,
    pub total_containers: i32,
    pub pickup_location: String,
    pub stuffing_location: Option<String>,
    pub delivery_location: String,
    pub commodity: String,
    pub cargo_type: String,
    pub cargo_weight: Decimal,
    pub expected_pickup_date: NaiveDate,
    pub expected_delivery_date: NaiveDate,
    pub requested_price: Decimal,
}

/// The JSON-encoded sub-fields, resolved differently on create and update
#[derive(Debug, Default)]
pub struct ServiceFields {
    pub service_type: Option<JsonField<ServiceTypes>>,
    pub service_prices: Option<JsonField<ServicePrices>>,
}

impl ServiceFields {
    /// On create an undecodable service type becomes `["Transport"]` and
    /// undecodable prices become `{}`. Absent values store empty defaults.
    pub fn resolve_for_create(self) -> (ServiceTypes, ServicePrices) {
        let service_type = match self.service_type {
            Some(field) => field
                .decode("service_type")
                .unwrap_or_else(fallback_service_types),
            None => ServiceTypes::new(),
        };
        let service_prices = self
            .service_prices
            .and_then(|field| field.decode("service_prices"))
            .unwrap_or_default();

        (service_type, service_prices)
    }

    /// On update an undecodable or absent value keeps what is stored.
    pub fn resolve_for_update(self, current: &TransportRequest) -> (ServiceTypes, ServicePrices) {
        let service_type = self
            .service_type
            .and_then(|field| field.decode("service_type"))
            .unwrap_or_else(|| current.service_type.clone());
        let service_prices = self
            .service_prices
            .and_then(|field| field.decode("service_prices"))
            .unwrap_or_else(|| current.service_prices.clone());

        (service_type, service_prices)
    }
}

impl RequestFields {
    pub fn validate(self) -> Result<(RequestDraft, ServiceFields)> {
        let mut check = FieldCheck::new();

        let vehicle_type = check.text("vehicleType", self.vehicle_type);
        let vehicle_size = check.text("vehicleSize", self.vehicle_size);
        let consignee = check.text("consignee", self.consignee);
        let consigner = check.text("consigner", self.consigner);
        let pickup_location = check.text("pickupLocation", self.pickup_location);
        let delivery_location = check.text("deliveryLocation", self.delivery_location);
        let commodity = check.text("commodity", self.commodity);
        let cargo_type = check.text("cargoType", self.cargo_type);
        let cargo_weight = check.value("cargoWeight", self.cargo_weight);
        let pickup_date = check.text("expectedPickupDate", self.expected_pickup_date);
        let delivery_date = check.text("expectedDeliveryDate", self.expected_delivery_date);
        let requested_price = check.value("requestedPrice", self.requested_price);
        check.finish()?;

        let containers_20ft = self.containers_20ft.unwrap_or(0);
        let containers_40ft = self.containers_40ft.unwrap_or(0);
        if containers_20ft < 0 || containers_40ft < 0 {
            return Err(AppError::Validation(
                "container counts must not be negative".to_string(),
            ));
        }

        let derived_total = containers_20ft
            .checked_add(containers_40ft)
            .ok_or_else(|| AppError::Validation("container counts out of range".to_string()))?;
        let total_containers = match self.total_containers {
            Some(total) => {
                if total != derived_total {
                    tracing::warn!(
                        "totalContainers {} does not match {} + {}",
                        total,
                        containers_20ft,
                        containers_40ft
                    );
                }
                total
            }
            None => derived_total,
        };

        let draft = RequestDraft {
            vehicle_type,
            vehicle_size,
            consignee,
            consigner,
            containers_20ft,
            containers_40ft,
            total_containers,
            pickup_location,
            stuffing_location: optional_text(self.stuffing_location),
            delivery_location,
            commodity,
            cargo_type,
            cargo_weight: to_two_places(non_negative("cargoWeight", cargo_weight)?),
            expected_pickup_date: date_field("expectedPickupDate", &pickup_date)?,
            expected_delivery_date: date_field("expectedDeliveryDate", &delivery_date)?,
            requested_price: to_two_places(non_negative("requestedPrice", requested_price)?),
        };

        let services = ServiceFields {
            service_type: self.service_type,
            service_prices: self.service_prices,
        };

        Ok((draft, services))
    }
}

/// Body of the admin status endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusChange {
    pub status: Option<String>,
    pub admin_comment: Option<String>,
}
