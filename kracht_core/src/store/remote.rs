//! REST-backed store for the hosted relational backend.
//!
//! Talks to a PostgREST-style API: one endpoint per table under
//! `/rest/v1/`, `apikey` plus bearer-token headers, upserts through
//! `Prefer: resolution=merge-duplicates`. Rows are scoped to the configured
//! user when a user id is set.

use super::Store;
use crate::config::RemoteConfig;
use crate::templates::{default_templates, upsert_templates};
use crate::{Error, Result, User, Workout, WorkoutSnack, WorkoutTemplate};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const WORKOUTS_TABLE: &str = "workouts";
const TEMPLATES_TABLE: &str = "workout_templates";
const PROFILES_TABLE: &str = "profiles";
const SNACKS_TABLE: &str = "workout_snacks";

const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

/// Outgoing row: the record's columns plus the owning user
#[derive(Serialize)]
struct Row<'a, T: Serialize> {
    #[serde(flatten)]
    record: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

/// Authenticated client for the remote backend
#[derive(Clone, Debug)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
    token: String,
    user_id: Option<String>,
}

impl RemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            token: config
                .access_token
                .clone()
                .unwrap_or_else(|| config.api_key.clone()),
            user_id: config.user_id.clone(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.token)
    }

    fn scoped(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.user_id {
            Some(id) => builder.query(&[("user_id", format!("eq.{}", id))]),
            None => builder,
        }
    }

    fn fetch<T: DeserializeOwned>(&self, table: &str, order: Option<&str>) -> Result<Vec<T>> {
        let mut builder = self
            .request(Method::GET, table)
            .query(&[("select", "*")]);
        if let Some(order) = order {
            builder = builder.query(&[("order", order)]);
        }

        let response = check(self.scoped(builder).send()?, "load", table)?;
        let rows: Vec<T> = response.json()?;
        tracing::debug!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    fn upsert<T: Serialize>(&self, table: &str, records: &[T]) -> Result<()> {
        let rows: Vec<Row<'_, T>> = records
            .iter()
            .map(|record| Row {
                record,
                user_id: self.user_id.as_deref(),
            })
            .collect();

        let response = self
            .request(Method::POST, table)
            .header("Prefer", UPSERT_PREFERENCE)
            .json(&rows)
            .send()?;
        check(response, "save", table)?;
        tracing::debug!("Upserted {} rows into {}", rows.len(), table);
        Ok(())
    }

    fn remove(&self, table: &str, id: &str) -> Result<()> {
        let builder = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{}", id))]);
        check(self.scoped(builder).send()?, "delete", table)?;
        tracing::debug!("Deleted {} from {}", id, table);
        Ok(())
    }

    fn stored_templates(&self) -> Result<Vec<WorkoutTemplate>> {
        self.fetch(TEMPLATES_TABLE, None)
    }
}

/// Map non-success responses to `StorageUnavailable`
fn check(response: Response, action: &str, table: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let reason = if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body
    };

    tracing::warn!("Remote {} on {} failed with {}: {}", action, table, status, reason);
    Err(Error::StorageUnavailable(format!(
        "{} {} failed ({}): {}",
        action, table, status, reason
    )))
}

impl Store for RemoteStore {
    fn load_workouts(&self) -> Result<Vec<Workout>> {
        let mut workouts: Vec<Workout> = self.fetch(WORKOUTS_TABLE, Some("date.desc"))?;
        crate::history::sort_newest_first(&mut workouts);
        Ok(workouts)
    }

    fn save_workout(&self, workout: &Workout) -> Result<()> {
        self.upsert(WORKOUTS_TABLE, std::slice::from_ref(workout))
    }

    fn delete_workout(&self, id: &str) -> Result<()> {
        self.remove(WORKOUTS_TABLE, id)
    }

    fn load_templates(&self) -> Result<Vec<WorkoutTemplate>> {
        let stored = self.stored_templates()?;
        if stored.is_empty() {
            Ok(default_templates())
        } else {
            Ok(stored)
        }
    }

    fn save_templates(&self, templates: &[WorkoutTemplate]) -> Result<()> {
        let stored = self.stored_templates()?;
        if stored.is_empty() {
            // First edit: persist the defaults alongside it
            let mut all = default_templates();
            upsert_templates(&mut all, templates);
            self.upsert(TEMPLATES_TABLE, &all)
        } else {
            self.upsert(TEMPLATES_TABLE, templates)
        }
    }

    fn delete_template(&self, id: &str) -> Result<()> {
        let stored = self.stored_templates()?;
        if stored.is_empty() {
            let remaining: Vec<_> = default_templates()
                .into_iter()
                .filter(|t| t.id != id)
                .collect();
            self.upsert(TEMPLATES_TABLE, &remaining)
        } else {
            self.remove(TEMPLATES_TABLE, id)
        }
    }

    fn load_profile(&self) -> Result<Option<User>> {
        let mut builder = self
            .request(Method::GET, PROFILES_TABLE)
            .query(&[("select", "*")]);
        if let Some(id) = &self.user_id {
            builder = builder.query(&[("id", format!("eq.{}", id))]);
        }

        let response = check(builder.send()?, "load", PROFILES_TABLE)?;
        let rows: Vec<User> = response.json()?;
        Ok(rows.into_iter().next())
    }

    fn save_profile(&self, user: &User) -> Result<()> {
        let response = self
            .request(Method::POST, PROFILES_TABLE)
            .header("Prefer", UPSERT_PREFERENCE)
            .json(&[user])
            .send()?;
        check(response, "save", PROFILES_TABLE)?;
        Ok(())
    }

    fn save_snack(&self, snack: &WorkoutSnack) -> Result<()> {
        self.upsert(SNACKS_TABLE, std::slice::from_ref(snack))
    }

    fn load_snacks(&self) -> Result<Vec<WorkoutSnack>> {
        self.fetch(SNACKS_TABLE, Some("date.desc"))
    }
}
