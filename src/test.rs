use std::sync::Arc;

use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;

use crate::{
    db::{self, user_store::NewUser, DbPool, RequestStore, TransporterStore, UserStore},
    error::AppError,
    models::{
        transport_request::{RequestFields, RequestStatus, TransportRequest},
        transporter::{ContainerFields, TransporterFields},
        user::{Role, User},
    },
    services::{AuthService, JwtCredentials, RequestService, TransporterService},
};

// Helper function to setup a test database.
// One connection only: every new connection to sqlite::memory: is a fresh database.
async fn setup_test_db() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    db::setup_database(&pool)
        .await
        .expect("Failed to create tables");
    pool
}

// Helper function to create a test user
async fn create_test_user(pool: &DbPool, email: &str, role: Role) -> User {
    UserStore::new(pool.clone())
        .create_user(NewUser {
            name: "Test User",
            email,
            phone: None,
            password_hash: "not-a-real-hash",
            role,
        })
        .await
        .expect("Failed to save user")
}

fn request_service(pool: &DbPool) -> RequestService {
    RequestService::new(RequestStore::new(pool.clone()))
}

fn transporter_service(pool: &DbPool) -> TransporterService {
    TransporterService::new(
        TransporterStore::new(pool.clone()),
        RequestStore::new(pool.clone()),
    )
}

fn sample_request_body() -> Value {
    json!({
        "vehicleType": "Trailer",
        "vehicleSize": "40ft",
        "consignee": "Harbor Foods",
        "consigner": "Inland Mills",
        "containers20ft": 2,
        "containers40ft": 1,
        "pickupLocation": "Nhava Sheva",
        "stuffingLocation": "Bhiwandi",
        "deliveryLocation": "Pune",
        "commodity": "Rice",
        "cargoType": "General",
        "cargoWeight": 1250.5,
        "serviceType": ["Transport", "Customs"],
        "servicePrices": { "Transport": 40000, "Customs": "5000" },
        "expectedPickupDate": "2024-05-01",
        "expectedDeliveryDate": "2024-05-04T10:30:00.000Z",
        "requestedPrice": 45000
    })
}

fn request_fields(body: Value) -> RequestFields {
    serde_json::from_value(body).expect("Invalid request fixture")
}

fn sample_transporter_body() -> Value {
    json!({
        "transporterName": "Coastal Haulers",
        "vehicleNumber": "MH-12-AB-1234",
        "vehicleMake": "Tata",
        "modelYear": 2021,
        "driverName": "Ravi",
        "driverContact": "+91 98200 00000",
        "licenseNumber": "DL-0420110012345",
        "licenseExpiry": "2027-03-31",
        "baseCharge": 1000
    })
}

fn transporter_fields(body: Value) -> TransporterFields {
    serde_json::from_value(body).expect("Invalid transporter fixture")
}

// Helper function to create a pending request owned by `owner`
async fn create_test_request(pool: &DbPool, owner: &User) -> TransportRequest {
    request_service(pool)
        .create_request(owner.id, request_fields(sample_request_body()))
        .await
        .expect("Failed to create request")
}

#[cfg(test)]
mod request_lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_request_is_pending_and_round_trips() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;

        let mut body = sample_request_body();
        body["status"] = json!("Approved");

        let created = request_service(&pool)
            .create_request(customer.id, request_fields(body))
            .await
            .unwrap();

        assert_eq!(created.customer_id, customer.id);
        assert_eq!(created.status, RequestStatus::Pending);
        assert_eq!(created.admin_comment, None);
        assert_eq!(created.total_containers, 3);
        assert_eq!(created.service_type, vec!["Transport", "Customs"]);
        assert_eq!(
            Value::Object(created.service_prices.clone()),
            json!({ "Transport": 40000, "Customs": "5000" })
        );

        let wire = serde_json::to_value(&created).unwrap();
        assert_eq!(wire["expectedPickupDate"], "2024-05-01");
        assert_eq!(wire["expectedDeliveryDate"], "2024-05-04");
        assert_eq!(wire["cargoWeight"], "1250.50");
        assert_eq!(wire["requestedPrice"], "45000.00");
        assert_eq!(wire["stuffingLocation"], "Bhiwandi");
    }

    #[tokio::test]
    async fn test_create_accepts_json_encoded_sub_fields() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;

        let mut body = sample_request_body();
        body["serviceType"] = json!("[\"Transport\",\"Storage\"]");
        body["servicePrices"] = json!("{\"Storage\":1200}");

        let created = request_service(&pool)
            .create_request(customer.id, request_fields(body))
            .await
            .unwrap();

        assert_eq!(created.service_type, vec!["Transport", "Storage"]);
        assert_eq!(Value::Object(created.service_prices), json!({ "Storage": 1200 }));
    }

    #[tokio::test]
    async fn test_create_falls_back_on_malformed_sub_fields() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;

        let mut body = sample_request_body();
        body["serviceType"] = json!("Transport, Customs");
        body["servicePrices"] = json!([1, 2, 3]);

        let created = request_service(&pool)
            .create_request(customer.id, request_fields(body))
            .await
            .unwrap();

        assert_eq!(created.service_type, vec!["Transport"]);
        assert!(created.service_prices.is_empty());
    }

    #[tokio::test]
    async fn test_create_without_sub_fields_stores_empty_values() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;

        let mut body = sample_request_body();
        let object = body.as_object_mut().unwrap();
        object.remove("serviceType");
        object.remove("servicePrices");

        let created = request_service(&pool)
            .create_request(customer.id, request_fields(body))
            .await
            .unwrap();

        assert!(created.service_type.is_empty());
        assert!(created.service_prices.is_empty());
    }

    #[tokio::test]
    async fn test_create_accepts_snake_case_body() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;

        let body = json!({
            "vehicle_type": "Trailer",
            "vehicle_size": "40ft",
            "consignee": "Harbor Foods",
            "consigner": "Inland Mills",
            "containers_20ft": 2,
            "containers_40ft": 0,
            "pickup_location": "Nhava Sheva",
            "delivery_location": "Pune",
            "commodity": "Rice",
            "cargo_type": "General",
            "cargo_weight": 500,
            "service_type": "[\"Transport\",\"Warehousing\"]",
            "service_prices": "{\"Transport\":30000}",
            "expected_pickup_date": "2024-05-01",
            "expected_delivery_date": "2024-05-02",
            "requested_price": 30000,
            "status": "Pending"
        });

        let created = request_service(&pool)
            .create_request(customer.id, request_fields(body))
            .await
            .unwrap();

        assert_eq!(created.vehicle_type, "Trailer");
        assert_eq!(created.total_containers, 2);
        assert_eq!(created.service_type, vec!["Transport", "Warehousing"]);
        assert_eq!(Value::Object(created.service_prices), json!({ "Transport": 30000 }));
        assert_eq!(created.requested_price.to_string(), "30000.00");
    }

    #[tokio::test]
    async fn test_create_rejects_overflowing_container_counts() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;

        let mut body = sample_request_body();
        body["containers20ft"] = json!(i32::MAX);
        body["containers40ft"] = json!(1);

        let service = request_service(&pool);
        let result = service.create_request(customer.id, request_fields(body)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(service.list_own_requests(customer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_reports_missing_fields() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;

        let result = request_service(&pool)
            .create_request(
                customer.id,
                request_fields(json!({ "vehicleType": "Trailer", "requestedPrice": 10 })),
            )
            .await;

        match result {
            Err(AppError::MissingFields(missing)) => {
                assert!(missing.contains(&"consignee"));
                assert!(missing.contains(&"expectedPickupDate"));
                assert!(!missing.contains(&"vehicleType"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let own = request_service(&pool).list_own_requests(customer.id).await.unwrap();
        assert!(own.is_empty());
    }

    #[tokio::test]
    async fn test_update_overwrites_fields_and_keeps_stored_sub_fields() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let created = create_test_request(&pool, &customer).await;

        let mut body = sample_request_body();
        body["consignee"] = json!("Harbor Foods Ltd");
        body["containers40ft"] = json!(3);
        body["serviceType"] = json!("{not json");
        body["servicePrices"] = json!("also not json");
        body["status"] = json!("Approved");

        let updated = request_service(&pool)
            .update_request(created.id, customer.id, request_fields(body))
            .await
            .unwrap();

        assert_eq!(updated.consignee, "Harbor Foods Ltd");
        assert_eq!(updated.total_containers, 5);
        assert_eq!(updated.status, RequestStatus::Pending);
        assert_eq!(updated.service_type, created.service_type);
        assert_eq!(updated.service_prices, created.service_prices);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_replaces_sub_fields_when_valid() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let created = create_test_request(&pool, &customer).await;

        let mut body = sample_request_body();
        body["serviceType"] = json!(["Storage"]);
        body["servicePrices"] = json!({ "Storage": 800 });

        let updated = request_service(&pool)
            .update_request(created.id, customer.id, request_fields(body))
            .await
            .unwrap();

        assert_eq!(updated.service_type, vec!["Storage"]);
        assert_eq!(Value::Object(updated.service_prices), json!({ "Storage": 800 }));
    }

    #[tokio::test]
    async fn test_update_by_another_customer_is_forbidden() {
        let pool = setup_test_db().await;
        let owner = create_test_user(&pool, "owner@example.com", Role::Customer).await;
        let other = create_test_user(&pool, "other@example.com", Role::Customer).await;
        let created = create_test_request(&pool, &owner).await;

        let mut body = sample_request_body();
        body["consignee"] = json!("Someone Else");

        let result = request_service(&pool)
            .update_request(created.id, other.id, request_fields(body))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let stored = RequestStore::new(pool.clone())
            .find_by_id(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.consignee, "Harbor Foods");
    }

    #[tokio::test]
    async fn test_update_unknown_request_is_not_found() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;

        let result = request_service(&pool)
            .update_request(999, customer.id, request_fields(sample_request_body()))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_after_decision_is_conflict() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let created = create_test_request(&pool, &customer).await;
        let service = request_service(&pool);

        service
            .transition_status(created.id, "rejected", Some("Route not served"))
            .await
            .unwrap();

        let result = service
            .update_request(created.id, customer.id, request_fields(sample_request_body()))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_own_requests_only_returns_callers_rows() {
        let pool = setup_test_db().await;
        let first = create_test_user(&pool, "first@example.com", Role::Customer).await;
        let second = create_test_user(&pool, "second@example.com", Role::Customer).await;

        let older = create_test_request(&pool, &first).await;
        create_test_request(&pool, &second).await;
        let newer = create_test_request(&pool, &first).await;

        let own = request_service(&pool).list_own_requests(first.id).await.unwrap();
        let ids: Vec<i64> = own.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert!(own.iter().all(|r| r.customer_id == first.id));
    }

    #[tokio::test]
    async fn test_list_all_requests_joins_customer() {
        let pool = setup_test_db().await;
        let first = create_test_user(&pool, "first@example.com", Role::Customer).await;
        let second = create_test_user(&pool, "second@example.com", Role::Customer).await;
        create_test_request(&pool, &first).await;
        create_test_request(&pool, &second).await;

        let all = request_service(&pool).list_all_requests().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].customer_email, "second@example.com");
        assert_eq!(all[1].customer_email, "first@example.com");

        let wire = serde_json::to_value(&all[0]).unwrap();
        assert_eq!(wire["customerName"], "Test User");
        assert_eq!(wire["consignee"], "Harbor Foods");
    }

    #[tokio::test]
    async fn test_transition_rejects_unknown_status_tokens() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let created = create_test_request(&pool, &customer).await;
        let service = request_service(&pool);

        for token in ["Approved", "pending", "cancelled"] {
            let result = service.transition_status(created.id, token, Some("ok")).await;
            assert!(matches!(result, Err(AppError::InvalidStatus)), "{token}");
        }

        let stored = RequestStore::new(pool.clone())
            .find_by_id(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_transition_requires_comment() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let created = create_test_request(&pool, &customer).await;
        let service = request_service(&pool);

        let blank = service.transition_status(created.id, "approved", Some("   ")).await;
        assert!(matches!(blank, Err(AppError::MissingComment)));

        let absent = service.transition_status(created.id, "approved", None).await;
        assert!(matches!(absent, Err(AppError::MissingComment)));
    }

    #[tokio::test]
    async fn test_transition_approves_once() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let created = create_test_request(&pool, &customer).await;
        let service = request_service(&pool);

        let approved = service
            .transition_status(created.id, "approved", Some("  Rate accepted  "))
            .await
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.admin_comment.as_deref(), Some("Rate accepted"));

        let again = service
            .transition_status(created.id, "rejected", Some("Changed my mind"))
            .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));

        let stored = RequestStore::new(pool.clone())
            .find_by_id(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
        assert_eq!(stored.admin_comment.as_deref(), Some("Rate accepted"));
    }

    #[tokio::test]
    async fn test_transition_unknown_request_is_not_found() {
        let pool = setup_test_db().await;
        let result = request_service(&pool)
            .transition_status(42, "approved", Some("fine"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

#[cfg(test)]
mod transporter_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_computes_total_charge() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;

        let details = transporter_service(&pool)
            .create_transporter_details(request.id, transporter_fields(sample_transporter_body()))
            .await
            .unwrap();

        assert_eq!(details.request_id, request.id);
        assert_eq!(details.total_charge.to_string(), "1000.00");

        let wire = serde_json::to_value(&details).unwrap();
        assert_eq!(wire["totalCharge"], "1000.00");
        assert_eq!(wire["additionalCharges"], "0.00");
        assert_eq!(wire["licenseExpiry"], "2027-03-31");
        assert_eq!(wire["vehicleMake"], "Tata");
    }

    #[tokio::test]
    async fn test_create_for_unknown_request_inserts_nothing() {
        let pool = setup_test_db().await;
        let service = transporter_service(&pool);

        let result = service
            .create_transporter_details(77, transporter_fields(sample_transporter_body()))
            .await;
        assert!(matches!(result, Err(AppError::NotFound("Transport request"))));

        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_reports_missing_fields() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;

        let mut body = sample_transporter_body();
        body["driverName"] = json!("");
        body.as_object_mut().unwrap().remove("baseCharge");

        let result = transporter_service(&pool)
            .create_transporter_details(request.id, transporter_fields(body))
            .await;
        match result {
            Err(AppError::MissingFields(missing)) => {
                assert_eq!(missing, vec!["driverName", "baseCharge"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_assignment_is_conflict() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;
        let service = transporter_service(&pool);

        service
            .create_transporter_details(request.id, transporter_fields(sample_transporter_body()))
            .await
            .unwrap();
        let second = service
            .create_transporter_details(request.id, transporter_fields(sample_transporter_body()))
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unique_constraint_backs_the_duplicate_check() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;
        let store = TransporterStore::new(pool.clone());
        let draft = transporter_fields(sample_transporter_body()).validate().unwrap();

        store.insert(request.id, &draft).await.unwrap();
        let result = store.insert(request.id, &draft).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_recomputes_total_charge() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;
        let service = transporter_service(&pool);

        let created = service
            .create_transporter_details(request.id, transporter_fields(sample_transporter_body()))
            .await
            .unwrap();

        let mut body = sample_transporter_body();
        body["baseCharge"] = json!("1500.5");
        body["additionalCharges"] = json!(249.5);
        body["driverName"] = json!("Sunil");

        let updated = service
            .update_transporter_details(created.id, transporter_fields(body))
            .await
            .unwrap();
        assert_eq!(updated.driver_name, "Sunil");
        assert_eq!(updated.total_charge.to_string(), "1750.00");
        assert_eq!(updated.request_id, request.id);
    }

    #[tokio::test]
    async fn test_update_unknown_details_is_not_found() {
        let pool = setup_test_db().await;
        let result = transporter_service(&pool)
            .update_transporter_details(5, transporter_fields(sample_transporter_body()))
            .await;
        assert!(matches!(result, Err(AppError::NotFound("Transporter details"))));

        let incomplete = transporter_service(&pool)
            .update_transporter_details(5, transporter_fields(json!({ "driverName": "Sunil" })))
            .await;
        assert!(matches!(incomplete, Err(AppError::NotFound("Transporter details"))));
    }

    #[tokio::test]
    async fn test_invalid_numbers_are_rejected_without_insert() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;
        let service = transporter_service(&pool);

        let mut overflowing = sample_transporter_body();
        overflowing["baseCharge"] = json!("79228162514264337593543950335");
        overflowing["additionalCharges"] = json!("1");
        let result = service
            .create_transporter_details(request.id, transporter_fields(overflowing))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let mut negative = sample_transporter_body();
        negative["numberOfContainers"] = json!(-2);
        let result = service
            .create_transporter_details(request.id, transporter_fields(negative))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_container_update_touches_only_container_fields() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;
        let service = transporter_service(&pool);

        let mut body = sample_transporter_body();
        body["line"] = json!("Maersk");
        let created = service
            .create_transporter_details(request.id, transporter_fields(body))
            .await
            .unwrap();
        assert_eq!(created.line.as_deref(), Some("Maersk"));

        let updated = service
            .update_container_fields(
                created.id,
                ContainerFields {
                    container_no: Some("MSKU1234565".into()),
                    line: None,
                    seal_no: Some("SL-889".into()),
                    number_of_containers: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.container_no.as_deref(), Some("MSKU1234565"));
        assert_eq!(updated.line, None);
        assert_eq!(updated.seal_no.as_deref(), Some("SL-889"));
        assert_eq!(updated.number_of_containers, Some(2));
        assert_eq!(updated.total_charge, created.total_charge);
        assert_eq!(updated.transporter_name, created.transporter_name);

        let missing = service
            .update_container_fields(9999, ContainerFields::default())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_by_request_id() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;
        let service = transporter_service(&pool);

        let before = service.get_by_request_id(request.id).await;
        assert!(matches!(before, Err(AppError::NotFound(_))));

        let created = service
            .create_transporter_details(request.id, transporter_fields(sample_transporter_body()))
            .await
            .unwrap();
        let found = service.get_by_request_id(request.id).await.unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_list_all_joins_request_and_customer() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;
        let service = transporter_service(&pool);

        service
            .create_transporter_details(request.id, transporter_fields(sample_transporter_body()))
            .await
            .unwrap();
        request_service(&pool)
            .transition_status(request.id, "approved", Some("Go ahead"))
            .await
            .unwrap();

        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].request_status, RequestStatus::Approved);
        assert_eq!(all[0].consigner, "Inland Mills");
        assert_eq!(all[0].customer_email, "customer@example.com");

        let wire = serde_json::to_value(&all[0]).unwrap();
        assert_eq!(wire["requestStatus"], "Approved");
        assert_eq!(wire["licenseExpiry"], "2027-03-31");
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = setup_test_db().await;
        let customer = create_test_user(&pool, "customer@example.com", Role::Customer).await;
        let request = create_test_request(&pool, &customer).await;
        let service = transporter_service(&pool);

        let created = service
            .create_transporter_details(request.id, transporter_fields(sample_transporter_body()))
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.get_by_request_id(request.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.delete(created.id).await, Err(AppError::NotFound(_))));

        // the request can be assigned again
        service
            .create_transporter_details(request.id, transporter_fields(sample_transporter_body()))
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod auth_tests {
    use super::*;
    use crate::models::user::{LoginRequest, SignupRequest};

    fn auth_service(pool: &DbPool, allow_admin_signup: bool) -> AuthService {
        AuthService::new(
            UserStore::new(pool.clone()),
            Arc::new(JwtCredentials::new("test-secret", 24)),
            allow_admin_signup,
        )
    }

    fn signup_request(email: &str, role: Option<Role>) -> SignupRequest {
        SignupRequest {
            name: Some("Asha".into()),
            email: Some(email.into()),
            phone: Some("  ".into()),
            password: Some("correct horse".into()),
            role,
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let pool = setup_test_db().await;
        let service = auth_service(&pool, false);

        let registered = service.signup(signup_request("asha@example.com", None)).await.unwrap();
        assert_eq!(registered.user.role, Role::Customer);
        assert_eq!(registered.user.phone, None);
        assert!(!registered.token.is_empty());

        let logged_in = service
            .login(LoginRequest {
                email: Some("asha@example.com".into()),
                password: Some("correct horse".into()),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let pool = setup_test_db().await;
        let service = auth_service(&pool, false);
        service.signup(signup_request("asha@example.com", None)).await.unwrap();

        let wrong_password = service
            .login(LoginRequest {
                email: Some("asha@example.com".into()),
                password: Some("wrong".into()),
            })
            .await;
        let unknown_email = service
            .login(LoginRequest {
                email: Some("nobody@example.com".into()),
                password: Some("correct horse".into()),
            })
            .await;

        for result in [wrong_password, unknown_email] {
            match result {
                Err(AppError::Auth(message)) => assert_eq!(message, "Invalid credentials"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let pool = setup_test_db().await;
        let service = auth_service(&pool, false);
        service.signup(signup_request("asha@example.com", None)).await.unwrap();

        let again = service.signup(signup_request("asha@example.com", None)).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_admin_signup_is_gated() {
        let pool = setup_test_db().await;

        let denied = auth_service(&pool, false)
            .signup(signup_request("root@example.com", Some(Role::Admin)))
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let allowed = auth_service(&pool, true)
            .signup(signup_request("root@example.com", Some(Role::Admin)))
            .await
            .unwrap();
        assert_eq!(allowed.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_list_users_hides_password_hash() {
        let pool = setup_test_db().await;
        create_test_user(&pool, "one@example.com", Role::Customer).await;
        create_test_user(&pool, "two@example.com", Role::Admin).await;

        let users = auth_service(&pool, false).list_users().await.unwrap();
        assert_eq!(users.len(), 2);

        let wire = serde_json::to_value(&users).unwrap();
        assert!(wire[0].get("passwordHash").is_none());
        assert_eq!(wire[1]["role"], "Admin");
    }
}
