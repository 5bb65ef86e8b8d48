use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::{
    error::{AppError, Result},
    models::{
        fields::{date_field, decimal_column, non_negative, optional_text, to_two_places, FieldCheck},
        transport_request::RequestStatus,
    },
};

/// Carrier assignment attached to a transport request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransporterDetails {
    pub id: i64,
    pub request_id: i64,
    pub transporter_name: String,
    pub vehicle_number: String,
    pub vehicle_make: Option<String>,
    pub model_year: Option<i32>,
    pub driver_name: String,
    pub driver_contact: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub base_charge: Decimal,
    pub additional_charges: Decimal,
    pub total_charge: Decimal,
    pub container_no: Option<String>,
    pub line: Option<String>,
    pub seal_no: Option<String>,
    pub number_of_containers: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for TransporterDetails {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            request_id: row.try_get("request_id")?,
            transporter_name: row.try_get("transporter_name")?,
            vehicle_number: row.try_get("vehicle_number")?,
            vehicle_make: row.try_get("vehicle_make")?,
            model_year: row.try_get("model_year")?,
            driver_name: row.try_get("driver_name")?,
            driver_contact: row.try_get("driver_contact")?,
            license_number: row.try_get("license_number")?,
            license_expiry: row.try_get("license_expiry")?,
            base_charge: decimal_column(row, "base_charge")?,
            additional_charges: decimal_column(row, "additional_charges")?,
            total_charge: decimal_column(row, "total_charge")?,
            container_no: row.try_get("container_no")?,
            line: row.try_get("line")?,
            seal_no: row.try_get("seal_no")?,
            number_of_containers: row.try_get("number_of_containers")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Transporter row joined with its request and the request's owner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransporterDetailsWithRequest {
    #[serde(flatten)]
    pub details: TransporterDetails,
    pub request_status: RequestStatus,
    pub consignee: String,
    pub consigner: String,
    pub customer_name: String,
    pub customer_email: String,
}

impl<'r> FromRow<'r, SqliteRow> for TransporterDetailsWithRequest {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            details: TransporterDetails::from_row(row)?,
            request_status: row.try_get("request_status")?,
            consignee: row.try_get("consignee")?,
            consigner: row.try_get("consigner")?,
            customer_name: row.try_get("customer_name")?,
            customer_email: row.try_get("customer_email")?,
        })
    }
}

/// The container shipment fields, also the body of the narrow update.
/// Fields here and in `TransporterFields` accept snake_case keys too.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerFields {
    #[serde(alias = "container_no")]
    pub container_no: Option<String>,
    pub line: Option<String>,
    #[serde(alias = "seal_no")]
    pub seal_no: Option<String>,
    #[serde(alias = "number_of_containers")]
    pub number_of_containers: Option<i32>,
}

impl ContainerFields {
    pub fn normalized(self) -> Result<Self> {
        if self.number_of_containers.is_some_and(|n| n < 0) {
            return Err(AppError::Validation(
                "numberOfContainers must not be negative".into(),
            ));
        }

        Ok(Self {
            container_no: optional_text(self.container_no),
            line: optional_text(self.line),
            seal_no: optional_text(self.seal_no),
            number_of_containers: self.number_of_containers,
        })
    }
}

/// Create/full-update payload
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransporterFields {
    #[serde(alias = "transporter_name")]
    pub transporter_name: Option<String>,
    #[serde(alias = "vehicle_number")]
    pub vehicle_number: Option<String>,
    #[serde(alias = "vehicle_make")]
    pub vehicle_make: Option<String>,
    #[serde(alias = "model_year")]
    pub model_year: Option<i32>,
    #[serde(alias = "driver_name")]
    pub driver_name: Option<String>,
    #[serde(alias = "driver_contact")]
    pub driver_contact: Option<String>,
    #[serde(alias = "license_number")]
    pub license_number: Option<String>,
    #[serde(alias = "license_expiry")]
    pub license_expiry: Option<String>,
    #[serde(alias = "base_charge")]
    pub base_charge: Option<Decimal>,
    #[serde(alias = "additional_charges")]
    pub additional_charges: Option<Decimal>,
    #[serde(flatten)]
    pub containers: ContainerFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransporterDraft {
    pub transporter_name: String,
    pub vehicle_number: String,
    pub vehicle_make: Option<String>,
    pub model_year: Option<i32>,
    pub driver_name: String,
    pub driver_contact: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub base_charge: Decimal,
    pub additional_charges: Decimal,
    /// Derived on every write, never taken from the client.
    pub total_charge: Decimal,
    pub containers: ContainerFields,
}

impl TransporterFields {
    pub fn validate(self) -> Result<TransporterDraft> {
        let mut check = FieldCheck::new();

        let transporter_name = check.text("transporterName", self.transporter_name);
        let vehicle_number = check.text("vehicleNumber", self.vehicle_number);
        let driver_name = check.text("driverName", self.driver_name);
        let driver_contact = check.text("driverContact", self.driver_contact);
        let license_number = check.text("licenseNumber", self.license_number);
        let license_expiry = check.text("licenseExpiry", self.license_expiry);
        let base_charge = check.value("baseCharge", self.base_charge);
        check.finish()?;

        let base_charge = to_two_places(non_negative("baseCharge", base_charge)?);
        let additional_charges = to_two_places(non_negative(
            "additionalCharges",
            self.additional_charges.unwrap_or(Decimal::ZERO),
        )?);
        let total_charge = base_charge
            .checked_add(additional_charges)
            .map(to_two_places)
            .ok_or_else(|| AppError::Validation("charges out of range".into()))?;

        Ok(TransporterDraft {
            transporter_name,
            vehicle_number,
            vehicle_make: optional_text(self.vehicle_make),
            model_year: self.model_year,
            driver_name,
            driver_contact,
            license_number,
            license_expiry: date_field("licenseExpiry", &license_expiry)?,
            base_charge,
            additional_charges,
            total_charge,
            containers: self.containers.normalized()?,
        })
    }
}
