//! Request body extraction into a [`RawPayload`].
//!
//! The body is read according to its declared content type. Malformed
//! JSON, form or multipart bodies yield whatever could be read; deciding
//! whether that is enough is left to the normalizer. Only transport
//! failures such as an oversized body are rejected here.

use axum::{
    Form, RequestExt,
    extract::{FromRequest, Multipart, Request},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use inference::RawPayload;
use std::collections::BTreeMap;

/// Extractor yielding the request body as a [`RawPayload`].
#[derive(Debug)]
pub struct Payload(pub RawPayload);

impl<S: Send + Sync> FromRequest<S> for Payload {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mime = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let payload = match mime.as_str() {
            "multipart/form-data" => multipart(req).await?,
            "application/x-www-form-urlencoded" => form(req, state).await?,
            _ => {
                let body = Bytes::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                if is_json(&mime) {
                    match serde_json::from_slice(&body) {
                        Ok(value) => RawPayload {
                            json: Some(value),
                            raw: body,
                            ..RawPayload::default()
                        },
                        Err(e) => {
                            tracing::debug!("ignoring malformed json body: {e}");
                            RawPayload::raw(body)
                        }
                    }
                } else {
                    RawPayload::raw(body)
                }
            }
        };
        Ok(Self(payload))
    }
}

fn is_json(mime: &str) -> bool {
    mime == "application/json" || mime.ends_with("+json")
}

async fn form<S: Send + Sync>(req: Request, state: &S) -> Result<RawPayload, Response> {
    match Form::<BTreeMap<String, String>>::from_request(req, state).await {
        Ok(Form(fields)) => Ok(RawPayload {
            form: fields,
            ..RawPayload::default()
        }),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(rejection.into_response())
        }
        Err(rejection) => {
            tracing::debug!("ignoring malformed form body: {}", rejection.body_text());
            Ok(RawPayload::default())
        }
    }
}

async fn multipart(req: Request) -> Result<RawPayload, Response> {
    let mut payload = RawPayload::default();
    let mut multipart = match req.extract::<Multipart, _>().await {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!("ignoring malformed multipart body: {}", rejection.body_text());
            return Ok(payload);
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(e.into_response());
            }
            Err(e) => {
                tracing::debug!("stopping at malformed multipart field: {}", e.body_text());
                break;
            }
        };

        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let is_file = field.file_name().is_some();
        let read = if is_file {
            field.bytes().await.map(|bytes| {
                payload.files.insert(name, bytes);
            })
        } else {
            field.text().await.map(|text| {
                payload.form.insert(name, text);
            })
        };
        if let Err(e) = read {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return Err(e.into_response());
            }
            tracing::debug!("stopping at unreadable multipart field: {}", e.body_text());
            break;
        }
    }
    Ok(payload)
}
