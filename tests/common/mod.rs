#![allow(dead_code)]

use alma_checkout::database::error::{DatabaseError, DatabaseErrorKind};
use alma_checkout::database::repository::{
    ConfigurationEntry, ConfigurationStore, GeoZoneEntry, GeoZoneRepository,
    OrderHistoryRepository, OrderStatusRecord,
};
use alma_checkout::error::{ExternalError, ProviderResult};
use alma_checkout::payments::types::{
    Eligibility, Installment, InstallmentState, PaymentPayload, PaymentSession, PaymentState,
};
use alma_checkout::payments::{
    Address, AlmaApi, AlmaPaymentModule, CustomerContact, ModuleOptions, OrderSnapshot,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scriptable Alma API that counts every call
pub struct FakeAlmaApi {
    pub eligibility: Mutex<ProviderResult<Eligibility>>,
    pub created: Mutex<ProviderResult<PaymentSession>>,
    pub fetched: Mutex<ProviderResult<PaymentSession>>,
    pub eligibility_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub last_payload: Mutex<Option<PaymentPayload>>,
}

impl FakeAlmaApi {
    pub fn new() -> Self {
        Self {
            eligibility: Mutex::new(Ok(Eligibility {
                eligible: true,
                reasons: None,
            })),
            created: Mutex::new(Ok(session("payment_new", PaymentState::NotStarted, 0, &[]))),
            fetched: Mutex::new(Ok(session(
                "payment_1",
                PaymentState::Paid,
                4999,
                &[InstallmentState::Paid],
            ))),
            eligibility_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }

    pub fn set_eligibility(&self, result: ProviderResult<Eligibility>) {
        *self.eligibility.lock().unwrap() = result;
    }

    pub fn set_created(&self, result: ProviderResult<PaymentSession>) {
        *self.created.lock().unwrap() = result;
    }

    pub fn set_fetched(&self, result: ProviderResult<PaymentSession>) {
        *self.fetched.lock().unwrap() = result;
    }

    pub fn eligibility_calls(&self) -> usize {
        self.eligibility_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlmaApi for FakeAlmaApi {
    async fn eligibility(&self, payload: &PaymentPayload) -> ProviderResult<Eligibility> {
        self.eligibility_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        self.eligibility.lock().unwrap().clone()
    }

    async fn create_payment(&self, payload: &PaymentPayload) -> ProviderResult<PaymentSession> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        self.created.lock().unwrap().clone()
    }

    async fn fetch_payment(&self, _id: &str) -> ProviderResult<PaymentSession> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct InMemoryConfigurationStore {
    pub values: Mutex<HashMap<String, String>>,
    pub fail: Mutex<bool>,
}

impl InMemoryConfigurationStore {
    pub fn with_values(values: &[(&str, &str)]) -> Self {
        let store = Self::default();
        {
            let mut map = store.values.lock().unwrap();
            for (key, value) in values {
                map.insert(key.to_string(), value.to_string());
            }
        }
        store
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if *self.fail.lock().unwrap() {
            return Err(DatabaseError::new(DatabaseErrorKind::ConnectionError {
                message: "store unavailable".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryConfigurationStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        self.check_available()?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn install_defaults(&self, entries: &[ConfigurationEntry]) -> Result<(), DatabaseError> {
        self.check_available()?;
        let mut map = self.values.lock().unwrap();
        for entry in entries {
            if map.contains_key(&entry.key) {
                return Err(DatabaseError::new(
                    DatabaseErrorKind::UniqueConstraintViolation {
                        column: "configuration_key".to_string(),
                        value: entry.key.clone(),
                    },
                ));
            }
            map.insert(entry.key.clone(), entry.value.clone());
        }
        Ok(())
    }

    async fn remove_all(&self, keys: &[String]) -> Result<u64, DatabaseError> {
        self.check_available()?;
        let mut map = self.values.lock().unwrap();
        Ok(keys.iter().filter(|key| map.remove(*key).is_some()).count() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryGeoZones {
    pub entries: Vec<GeoZoneEntry>,
    pub calls: AtomicUsize,
}

impl InMemoryGeoZones {
    pub fn new(entries: Vec<GeoZoneEntry>) -> Self {
        Self {
            entries,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoZoneRepository for InMemoryGeoZones {
    async fn entries(
        &self,
        geo_zone_id: i64,
        country_id: i64,
    ) -> Result<Vec<GeoZoneEntry>, DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut entries: Vec<GeoZoneEntry> = self
            .entries
            .iter()
            .filter(|e| e.geo_zone_id == geo_zone_id && e.country_id == country_id)
            .copied()
            .collect();
        entries.sort_by_key(|e| e.zone_id);
        Ok(entries)
    }
}

#[derive(Default)]
pub struct InMemoryOrderHistory {
    pub records: Mutex<Vec<OrderStatusRecord>>,
}

impl InMemoryOrderHistory {
    pub fn records(&self) -> Vec<OrderStatusRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderHistoryRepository for InMemoryOrderHistory {
    async fn append(&self, record: &OrderStatusRecord) -> Result<(), DatabaseError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub fn session(
    id: &str,
    state: PaymentState,
    purchase_amount: i64,
    plan: &[InstallmentState],
) -> PaymentSession {
    PaymentSession {
        id: id.to_string(),
        url: format!("https://checkout.sandbox.getalma.eu/{}", id),
        state,
        purchase_amount,
        payment_plan: plan
            .iter()
            .map(|state| Installment {
                state: *state,
                ..Default::default()
            })
            .collect(),
    }
}

pub fn provider_error(details: &[&str]) -> ExternalError {
    ExternalError::PaymentProvider {
        provider: "Alma".to_string(),
        status: 400,
        message: "Invalid request".to_string(),
        details: details.iter().map(|d| d.to_string()).collect(),
    }
}

pub fn geo_entry(geo_zone_id: i64, country_id: i64, zone_id: Option<i64>) -> GeoZoneEntry {
    GeoZoneEntry {
        geo_zone_id,
        country_id,
        zone_id,
    }
}

/// A French order billed to country 10, zone 8
pub fn order(total: Option<Decimal>) -> OrderSnapshot {
    let address = Address {
        first_name: Some("Jeanne".to_string()),
        last_name: Some("Martin".to_string()),
        street_address: Some("12 rue de Rivoli".to_string()),
        suburb: None,
        postcode: Some("75001".to_string()),
        city: Some("Paris".to_string()),
        country_iso_code: Some("FR".to_string()),
    };

    OrderSnapshot {
        billing_country_id: 10,
        billing_zone_id: 8,
        billing: address.clone(),
        delivery: address,
        customer: CustomerContact {
            first_name: Some("Jeanne".to_string()),
            last_name: Some("Martin".to_string()),
            email: Some("jeanne@example.com".to_string()),
            phone: None,
        },
        total,
    }
}

pub struct Harness {
    pub api: Arc<FakeAlmaApi>,
    pub store: Arc<InMemoryConfigurationStore>,
    pub geo_zones: Arc<InMemoryGeoZones>,
    pub history: Arc<InMemoryOrderHistory>,
    pub module: AlmaPaymentModule,
}

pub fn harness(settings: &[(&str, &str)], geo_entries: Vec<GeoZoneEntry>) -> Harness {
    let api = Arc::new(FakeAlmaApi::new());
    let store = Arc::new(InMemoryConfigurationStore::with_values(settings));
    let geo_zones = Arc::new(InMemoryGeoZones::new(geo_entries));
    let history = Arc::new(InMemoryOrderHistory::default());

    let module = AlmaPaymentModule::new(
        ModuleOptions::default(),
        api.clone(),
        store.clone(),
        geo_zones.clone(),
        history.clone(),
    );

    Harness {
        api,
        store,
        geo_zones,
        history,
        module,
    }
}
