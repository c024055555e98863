//! Response bodies for the JSON API.
//!
//! Successful responses are JSON:API documents with the content type
//! [CONTENT_TYPE]. Errors are plain JSON objects of the form
//! `{"message": "...", "errors": {"field": ["..."]}}`.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{Error, pagination::Page};

/// The media type of JSON:API documents.
pub const CONTENT_TYPE: &str = "application/vnd.api+json";

#[derive(Debug, Serialize, PartialEq)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// A single resource in a JSON:API document.
#[derive(Debug, Serialize, PartialEq)]
pub struct ResourceObject<A> {
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    pub id: String,
    pub attributes: A,
    pub links: ResourceLinks,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PaginationMeta {
    pub total: u64,
    pub count: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Meta {
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PaginationLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub last: String,
}

/// A top-level JSON:API document.
#[derive(Debug, Serialize, PartialEq)]
pub struct Document<D> {
    pub data: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PaginationLinks>,
}

impl<A: Serialize> Document<ResourceObject<A>> {
    /// A document holding exactly one resource.
    pub fn single(resource: ResourceObject<A>) -> Self {
        Self {
            data: resource,
            meta: None,
            links: None,
        }
    }
}

impl<A: Serialize> Document<Vec<ResourceObject<A>>> {
    /// A document holding one page of a collection of `total` resources found at `collection_url`.
    pub fn page(
        resources: Vec<ResourceObject<A>>,
        page: Page,
        total: u64,
        collection_url: &str,
    ) -> Self {
        let total_pages = page.page_count(total);
        let page_url =
            |number: u64| format!("{collection_url}?page={number}&limit={}", page.size);

        Self {
            meta: Some(Meta {
                pagination: PaginationMeta {
                    total,
                    count: resources.len() as u64,
                    per_page: page.size,
                    current_page: page.number,
                    total_pages,
                },
            }),
            links: Some(PaginationLinks {
                self_link: page_url(page.number),
                first: page_url(1),
                last: page_url(total_pages),
            }),
            data: resources,
        }
    }
}

impl<D: Serialize> Document<D> {
    /// Serialize the document as the body of a response with `status`.
    pub fn into_response(self, status: StatusCode) -> Response {
        match serde_json::to_vec(&self) {
            Ok(body) => (status, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
            Err(error) => {
                tracing::error!("Could not serialize JSON:API document: {error}");
                ErrorDocument::new("Internal server error")
                    .into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// The body of an error response.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorDocument {
    pub message: String,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ErrorDocument {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            errors: BTreeMap::new(),
        }
    }

    /// An error caused by the value of a single request field.
    pub fn with_field_error(field: &str, message: &str) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add(field, message);
        errors.into_document()
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// An [Error] returned by a JSON API handler.
///
/// It responds with an [ErrorDocument] instead of an HTML error page.
#[derive(Debug, PartialEq)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected JSON body: {rejection}");

        Self(Error::MalformedRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        })
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query string: {rejection}");

        Self(Error::MalformedRequest {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.into_api_response()
    }
}

/// Messages for the request fields that failed validation, keyed by field name.
#[derive(Debug, Default, PartialEq)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.to_owned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    /// The first message becomes the summary message of the document.
    fn into_document(self) -> ErrorDocument {
        let message = self
            .0
            .values()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_else(|| "The given data was invalid.".to_owned());

        ErrorDocument {
            message,
            errors: self.0,
        }
    }
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        self.into_document()
            .into_response(StatusCode::UNPROCESSABLE_ENTITY)
    }
}
