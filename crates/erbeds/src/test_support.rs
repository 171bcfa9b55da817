//! Fakes and helpers shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use crate::beds::{BedQuery, BedSource};
use crate::error::{Error, Result};
use crate::geocode::{Geocoder, Location};
use crate::hospital::{Hospital, RawHospital};

/// Build a hospital with the given ER counts and id `ID-<name>`.
pub(crate) fn hospital(name: &str, general: i64, pediatric: i64, night: i64) -> Hospital {
    Hospital::from_raw(RawHospital {
        duty_name: Some(name.to_string()),
        hpid: Some(format!("ID-{name}")),
        hv1: Some(general),
        hv2: Some(pediatric),
        hv3: Some(night),
        ..RawHospital::default()
    })
}

/// Serve a router on an ephemeral local port, returning its base URL.
pub(crate) async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{addr}")
}

/// A [`BedSource`] returning a canned body.
#[derive(Debug)]
pub(crate) struct FakeBeds {
    body: Option<Value>,
    queries: Mutex<Vec<BedQuery>>,
}

impl FakeBeds {
    /// Answer every query with these rows.
    pub(crate) fn with_items(items: Value) -> Self {
        let total = items.as_array().map_or(1, Vec::len);
        Self {
            body: Some(json!({
                "items": { "item": items },
                "numOfRows": 50,
                "pageNo": 1,
                "totalCount": total,
            })),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answer every query with an upstream error.
    pub(crate) fn failing() -> Self {
        Self {
            body: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn last_query(&self) -> Option<BedQuery> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl BedSource for FakeBeds {
    async fn fetch_body(&self, query: &BedQuery) -> Result<Value> {
        self.queries.lock().unwrap().push(query.clone());
        self.body
            .clone()
            .ok_or_else(|| Error::upstream("99", "fake upstream failure"))
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Found(f64, f64),
    Fail,
}

/// A [`Geocoder`] with scripted answers; unknown names are not found.
#[derive(Debug, Default)]
pub(crate) struct FakeGeocoder {
    outcomes: HashMap<String, Outcome>,
    latency: Duration,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeGeocoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn found(mut self, name: &str, lat: f64, lon: f64) -> Self {
        self.outcomes
            .insert(name.to_string(), Outcome::Found(lat, lon));
        self
    }

    pub(crate) fn failing(mut self, name: &str) -> Self {
        self.outcomes.insert(name.to_string(), Outcome::Fail);
        self
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Names looked up, in call order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Time between consecutive lookups.
    pub(crate) fn call_gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls
            .windows(2)
            .map(|pair| pair[1].1.duration_since(pair[0].1))
            .collect()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn locate(&self, name: &str) -> Result<Option<Location>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), Instant::now()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.outcomes.get(name) {
            Some(Outcome::Found(lat, lon)) => Ok(Some(Location {
                name: name.to_string(),
                address: format!("{name} address"),
                lat: *lat,
                lon: *lon,
            })),
            Some(Outcome::Fail) => Err(Error::internal("fake geocoder failure")),
            None => Ok(None),
        }
    }
}
