//! Generic CRUD handlers for kegiatan, kehadiran and kategori
//!
//! Each resource only describes its fields and validation through
//! [`Resource`]; list, get, create, update and delete are shared.

use bson::doc;
use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use tracing::info;

use crate::auth::Claims;
use crate::db::mongo::parse_object_id;
use crate::db::schemas::{Record, RecordView, Resource};
use crate::db::DocumentStore;
use crate::routes::response::{json_response, message_response, parse_json_body, FullBody};
use crate::types::UkmError;

fn not_found<T: Resource>() -> UkmError {
    UkmError::NotFound(format!("{} not found", T::LABEL))
}

pub async fn list<T: Resource>(
    store: &dyn DocumentStore<Record<T>>,
) -> Result<Response<FullBody>, UkmError> {
    let records = store.find_many(doc! {}).await?;
    let views: Vec<RecordView<T>> = records.into_iter().map(Record::into_view).collect();
    Ok(json_response(StatusCode::OK, &views))
}

pub async fn get<T: Resource>(
    store: &dyn DocumentStore<Record<T>>,
    id: &str,
) -> Result<Response<FullBody>, UkmError> {
    let id = parse_object_id(id)?;
    let record = store.find_by_id(id).await?.ok_or_else(not_found::<T>)?;
    Ok(json_response(StatusCode::OK, &record.into_view()))
}

/// Server-side defaults are filled from the caller before validation runs.
pub async fn create<T, B>(
    store: &dyn DocumentStore<Record<T>>,
    caller: &Claims,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    T: Resource,
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut fields: T = parse_json_body(req).await?;
    fields.prepare(caller);
    fields.validate()?;

    let mut record = Record::new(fields);
    let id = store.insert_one(record.clone()).await?;
    record._id = Some(id);

    info!("{} {} created by {}", T::LABEL, id, caller.subject_id);
    Ok(json_response(StatusCode::CREATED, &record.into_view()))
}

pub async fn update<T, B>(
    store: &dyn DocumentStore<Record<T>>,
    id: &str,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    T: Resource,
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let id = parse_object_id(id)?;
    let fields: T = parse_json_body(req).await?;
    fields.validate()?;

    if !store.set_fields(id, fields.update_document()?).await? {
        return Err(not_found::<T>());
    }

    Ok(message_response(StatusCode::OK, &format!("{} updated", T::LABEL)))
}

pub async fn delete<T: Resource>(
    store: &dyn DocumentStore<Record<T>>,
    id: &str,
) -> Result<Response<FullBody>, UkmError> {
    let id = parse_object_id(id)?;

    if !store.delete_by_id(id).await? {
        return Err(not_found::<T>());
    }

    info!("{} {} deleted", T::LABEL, id);
    Ok(message_response(StatusCode::OK, &format!("{} deleted", T::LABEL)))
}
