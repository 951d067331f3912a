//! REST
//!
//! Client for the hosted backend, which exposes each table through a PostgREST-style query API.
//! Rows are filtered with `column=op.value` query parameters and every modifying request asks for
//! the affected rows in the response.

use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use fitlog_domain as domain;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::json;
use strum::AsRefStr;
use uuid::Uuid;

use crate::Config;

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    #[strum(serialize = "workouts")]
    Workouts,
    #[strum(serialize = "exercises")]
    Exercises,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub table: Table,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl Request {
    fn new(method: Method, table: Table) -> Self {
        Self {
            method,
            table,
            query: vec![],
            body: None,
        }
    }

    fn get(table: Table) -> Self {
        Self::new(Method::Get, table)
    }

    fn post(table: Table) -> Self {
        Self::new(Method::Post, table)
    }

    fn patch(table: Table) -> Self {
        Self::new(Method::Patch, table)
    }

    fn delete(table: Table) -> Self {
        Self::new(Method::Delete, table)
    }

    fn filter(mut self, column: &str, op: &str, value: impl ToString) -> Self {
        self.query
            .push((column.to_string(), format!("{op}.{}", value.to_string())));
        self
    }

    fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.query
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    fn limit(mut self, limit: usize) -> Self {
        self.query.push(("limit".to_string(), limit.to_string()));
        self
    }

    fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, domain::StorageError>;
}

pub struct ReqwestSendRequest {
    client: reqwest::Client,
    config: Config,
    access_token: Option<String>,
}

impl ReqwestSendRequest {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()?,
            config,
            access_token: None,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config::from_env().context("failed to load backend configuration")?;
        Self::new(config).context("failed to create HTTP client")
    }

    /// Authorize requests as the signed-in user instead of with the public API key.
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    fn url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.config.backend_url, table.as_ref())
    }

    fn bearer_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.config.api_key)
    }
}

impl SendRequest for ReqwestSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, domain::StorageError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, self.url(request.table))
            .query(&request.query)
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer_token())
            .header("Prefer", "return=representation");
        if let Some(body) = request.body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|err| {
            debug!("request to {} failed: {err}", request.table.as_ref());
            domain::StorageError::NoConnection
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| domain::StorageError::Other(err.into()))?;

        Ok(Response { status, body })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RESTError {
    #[error("{0} {1}")]
    Status(u16, String),
    #[error("deserialization failed: {0}")]
    Deserialization(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] domain::StorageError),
}

impl RESTError {
    fn into_storage_error(self) -> Result<domain::StorageError, Self> {
        match self {
            RESTError::Storage(storage) => Ok(storage),
            RESTError::Status(401 | 403, _) => Ok(domain::StorageError::NoSession),
            other => Err(other),
        }
    }
}

impl From<RESTError> for domain::ReadError {
    fn from(value: RESTError) -> Self {
        match value.into_storage_error() {
            Ok(storage) => domain::ReadError::Storage(storage),
            Err(RESTError::Status(404, _)) => domain::ReadError::NotFound,
            Err(other) => domain::ReadError::Other(other.into()),
        }
    }
}

impl From<RESTError> for domain::CreateError {
    fn from(value: RESTError) -> Self {
        match value.into_storage_error() {
            Ok(storage) => domain::CreateError::Storage(storage),
            Err(RESTError::Status(409, _)) => domain::CreateError::Conflict,
            Err(other) => domain::CreateError::Other(other.into()),
        }
    }
}

impl From<RESTError> for domain::UpdateError {
    fn from(value: RESTError) -> Self {
        match value.into_storage_error() {
            Ok(storage) => domain::UpdateError::Storage(storage),
            Err(RESTError::Status(404, _)) => domain::UpdateError::NotFound,
            Err(RESTError::Status(409, _)) => domain::UpdateError::Conflict,
            Err(other) => domain::UpdateError::Other(other.into()),
        }
    }
}

impl From<RESTError> for domain::DeleteError {
    fn from(value: RESTError) -> Self {
        match value.into_storage_error() {
            Ok(storage) => domain::DeleteError::Storage(storage),
            Err(RESTError::Status(404, _)) => domain::DeleteError::NotFound,
            Err(other) => domain::DeleteError::Other(other.into()),
        }
    }
}

#[derive(Clone)]
pub struct REST<S: SendRequest> {
    sender: S,
}

impl<S: SendRequest> REST<S> {
    pub const fn new(sender: S) -> Self {
        Self { sender }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: Request) -> Result<T, RESTError> {
        let response = self.sender.send_request(request).await?;
        if response.ok() {
            Ok(serde_json::from_str::<T>(&response.body)?)
        } else {
            Err(RESTError::Status(response.status, response.body))
        }
    }

    /// Fetch the rows affected by a modifying request, failing with 404 if there are none.
    async fn fetch_one<T: DeserializeOwned>(&self, request: Request) -> Result<T, RESTError> {
        self.fetch::<Vec<T>>(request)
            .await?
            .into_iter()
            .next()
            .ok_or(RESTError::Status(404, String::new()))
    }
}

fn convert_rows<R, T>(rows: Vec<R>, entity: &str) -> Vec<T>
where
    T: TryFrom<R>,
    <T as TryFrom<R>>::Error: std::fmt::Display,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("skipping invalid {entity}: {err}");
                None
            }
        })
        .collect()
}

impl<S: SendRequest> domain::WorkoutRepository for REST<S> {
    async fn read_workouts(
        &self,
        owner_id: &domain::UserID,
    ) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        let rows = self
            .fetch::<Vec<Workout>>(
                Request::get(Table::Workouts)
                    .filter("clerk_user_id", "eq", owner_id)
                    .order("created_at", false),
            )
            .await?;
        Ok(convert_rows(rows, "workout"))
    }

    async fn read_recent_workouts(
        &self,
        owner_id: &domain::UserID,
        limit: usize,
    ) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        let rows = self
            .fetch::<Vec<Workout>>(
                Request::get(Table::Workouts)
                    .filter("clerk_user_id", "eq", owner_id)
                    .order("created_at", false)
                    .limit(limit),
            )
            .await?;
        Ok(convert_rows(rows, "workout"))
    }

    async fn read_workouts_between(
        &self,
        owner_id: &domain::UserID,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        let rows = self
            .fetch::<Vec<Workout>>(
                Request::get(Table::Workouts)
                    .filter("clerk_user_id", "eq", owner_id)
                    .filter("workout_date", "gte", first)
                    .filter("workout_date", "lte", last)
                    .order("workout_date", false),
            )
            .await?;
        Ok(convert_rows(rows, "workout"))
    }

    async fn create_workout(
        &self,
        owner_id: &domain::UserID,
        workout: domain::NewWorkout,
    ) -> Result<domain::WorkoutRecord, domain::CreateError> {
        let row = self
            .fetch_one::<Workout>(
                Request::post(Table::Workouts).json(json!({
                    "clerk_user_id": owner_id.as_ref(),
                    "exercises": exercise_rows(&workout.exercises),
                    "duration": u32::from(workout.duration),
                    "total_sets": workout.total_sets,
                    "total_reps": workout.total_reps,
                    "workout_date": workout.date,
                })),
            )
            .await?;
        domain::WorkoutRecord::try_from(row).map_err(|err| domain::CreateError::Other(err.into()))
    }

    async fn modify_workout(
        &self,
        id: domain::WorkoutID,
        changes: domain::WorkoutChanges,
    ) -> Result<domain::WorkoutRecord, domain::UpdateError> {
        let mut body = serde_json::Map::new();
        if let Some((total_sets, total_reps)) = changes.totals() {
            body.insert("total_sets".into(), json!(total_sets));
            body.insert("total_reps".into(), json!(total_reps));
        }
        if let Some(exercises) = &changes.exercises {
            body.insert("exercises".into(), json!(exercise_rows(exercises)));
        }
        if let Some(duration) = changes.duration {
            body.insert("duration".into(), json!(u32::from(duration)));
        }
        if let Some(date) = changes.date {
            body.insert("workout_date".into(), json!(date));
        }

        let row = self
            .fetch_one::<Workout>(
                Request::patch(Table::Workouts)
                    .filter("id", "eq", *id)
                    .json(body.into()),
            )
            .await?;
        domain::WorkoutRecord::try_from(row).map_err(|err| domain::UpdateError::Other(err.into()))
    }

    async fn delete_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        self.fetch_one::<serde_json::Value>(Request::delete(Table::Workouts).filter("id", "eq", *id))
            .await?;
        Ok(id)
    }
}

impl<S: SendRequest> domain::ExerciseRepository for REST<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let rows = self
            .fetch::<Vec<Exercise>>(Request::get(Table::Exercises).order("name", true))
            .await?;
        Ok(convert_rows(rows, "exercise"))
    }

    async fn create_exercise(
        &self,
        exercise: domain::NewExercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let row = self
            .fetch_one::<Exercise>(Request::post(Table::Exercises).json(json!({
                "name": exercise.name.as_ref(),
                "muscle_group": exercise.muscle_group.as_ref(),
                "instructions": exercise.instructions,
                "difficulty": exercise.difficulty.as_ref(),
            })))
            .await?;
        domain::Exercise::try_from(row).map_err(|err| domain::CreateError::Other(err.into()))
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        let row = self
            .fetch_one::<Exercise>(
                Request::patch(Table::Exercises)
                    .filter("id", "eq", *exercise.id)
                    .json(json!({
                        "name": exercise.name.as_ref(),
                        "muscle_group": exercise.muscle_group.as_ref(),
                        "instructions": exercise.instructions,
                        "difficulty": exercise.difficulty.as_ref(),
                    })),
            )
            .await?;
        domain::Exercise::try_from(row).map_err(|err| domain::UpdateError::Other(err.into()))
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        self.fetch_one::<serde_json::Value>(
            Request::delete(Table::Exercises).filter("id", "eq", *id),
        )
        .await?;
        Ok(id)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RowError {
    #[error("invalid workout date {0:?}")]
    Date(String),
    #[error("invalid owner: {0}")]
    Owner(#[from] domain::UserIDError),
    #[error("invalid name: {0}")]
    Name(#[from] domain::NameError),
    #[error("invalid {0} {1:?}")]
    Unknown(&'static str, String),
}

const MAX_COUNT: u32 = 999;
const MAX_MINUTES: u32 = 1439;

/// A stored workout.
///
/// Apart from the identifiers and `created_at`, every field is read leniently. Invalid numbers
/// become 0 and invalid exercise entries are dropped, so that a single bad value cannot fail a
/// whole fetch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub clerk_user_id: String,
    #[serde(default, deserialize_with = "lenient_exercises")]
    pub exercises: Vec<WorkoutExercise>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub duration: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_sets: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_reps: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workout_date: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Workout> for domain::WorkoutRecord {
    type Error = RowError;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        let id = value.id;
        Ok(Self {
            id: id.into(),
            owner_id: domain::UserID::new(&value.clerk_user_id)?,
            date: parse_workout_date(&value.workout_date)?,
            exercises: value
                .exercises
                .into_iter()
                .filter_map(|exercise| match domain::WorkoutExercise::try_from(exercise) {
                    Ok(exercise) => Some(exercise),
                    Err(err) => {
                        warn!("dropping exercise entry of workout {id}: {err}");
                        None
                    }
                })
                .collect(),
            duration: clamped(
                domain::Minutes::new,
                value.duration,
                MAX_MINUTES,
                "duration",
            ),
            total_sets: value.total_sets,
            total_reps: value.total_reps,
            created_at: value.created_at,
        })
    }
}

/// Parse a stored workout date, reducing timestamps to their calendar date in UTC.
pub fn parse_workout_date(value: &str) -> Result<NaiveDate, RowError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| RowError::Date(value.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sets: u32,
    #[serde(default, deserialize_with = "lenient_counts")]
    pub reps: Vec<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    #[serde(
        rename = "restTime",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub rest_time: Option<String>,
}

impl From<&domain::WorkoutExercise> for WorkoutExercise {
    fn from(value: &domain::WorkoutExercise) -> Self {
        Self {
            name: value.name.to_string(),
            sets: u32::from(value.sets),
            reps: value.reps.iter().map(|r| u32::from(*r)).collect(),
            notes: value.notes.clone(),
            rest_time: value.rest.map(|r| r.to_string()),
        }
    }
}

/// Only a missing or invalid name rejects an entry. Counts are clamped and a rest time that
/// cannot be read is dropped.
impl TryFrom<WorkoutExercise> for domain::WorkoutExercise {
    type Error = RowError;

    fn try_from(value: WorkoutExercise) -> Result<Self, Self::Error> {
        Ok(Self {
            name: domain::Name::new(&value.name)?,
            sets: clamped(domain::Sets::new, value.sets, MAX_COUNT, "sets"),
            reps: value
                .reps
                .into_iter()
                .map(|reps| clamped(domain::Reps::new, reps, MAX_COUNT, "reps"))
                .collect(),
            notes: value.notes.filter(|n| !n.trim().is_empty()),
            rest: value
                .rest_time
                .filter(|r| !r.trim().is_empty())
                .and_then(|r| match domain::RestTime::try_from(r.as_str()) {
                    Ok(rest) => Some(rest),
                    Err(err) => {
                        warn!("ignoring rest time {r:?}: {err}");
                        None
                    }
                }),
        })
    }
}

fn clamped<T: Default, E>(
    new: impl Fn(u32) -> Result<T, E>,
    value: u32,
    max: u32,
    field: &str,
) -> T {
    if value > max {
        warn!("clamping {field} {value} to {max}");
    }
    new(value.min(max)).unwrap_or_default()
}

/// Read a stored count. Missing values are 0, as are negative, fractional and non-numeric ones.
fn count(value: &serde_json::Value) -> u32 {
    let parsed = match value {
        serde_json::Value::Null => return 0,
        serde_json::Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        warn!("treating invalid count {value} as 0");
        0
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(count(&serde_json::Value::deserialize(deserializer)?))
}

fn lenient_counts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u32>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(values) => values.iter().map(count).collect(),
        serde_json::Value::Null => vec![],
        other => {
            warn!("treating invalid reps {other} as empty");
            vec![]
        }
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_exercises<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<WorkoutExercise>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(values) => values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<WorkoutExercise>(value) {
                Ok(exercise) => Some(exercise),
                Err(err) => {
                    warn!("dropping unreadable exercise entry: {err}");
                    None
                }
            })
            .collect(),
        serde_json::Value::Null => vec![],
        other => {
            warn!("treating invalid exercises {other} as empty");
            vec![]
        }
    })
}

fn exercise_rows(exercises: &[domain::WorkoutExercise]) -> Vec<WorkoutExercise> {
    exercises.iter().map(WorkoutExercise::from).collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub muscle_group: String,
    pub instructions: Option<String>,
    pub difficulty: Option<String>,
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = RowError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            muscle_group: domain::MuscleGroup::from_str(value.muscle_group.trim())
                .map_err(|_| RowError::Unknown("muscle group", value.muscle_group.clone()))?,
            instructions: value.instructions.unwrap_or_default(),
            difficulty: match value.difficulty {
                Some(difficulty) => domain::Difficulty::from_str(difficulty.trim())
                    .map_err(|_| RowError::Unknown("difficulty", difficulty.clone()))?,
                None => domain::Difficulty::default(),
            },
        })
    }
}
