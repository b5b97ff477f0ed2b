// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fluent request path builder
//!
//! Accumulates URL path segments and query parameters, then executes one
//! HTTP call. Any status ≥ 400 becomes [`ConchError::Http`]; a body that
//! does not decode into the requested type becomes [`ConchError::Decode`].

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::ConchClient;
use crate::errors::{ConchError, ConchResult};

/// A request under construction
#[derive(Debug, Clone)]
pub struct Request<'a> {
    client: &'a ConchClient,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl<'a> Request<'a> {
    pub(crate) fn new(client: &'a ConchClient) -> Self {
        Self {
            client,
            segments: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Append a path segment; the value is percent-encoded
    pub fn segment(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Encoded path, always starting with `/`
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    /// GET and decode the response body
    pub async fn get<T: DeserializeOwned>(self) -> ConchResult<T> {
        let (method, path, response) = self.send(Method::GET, None).await?;
        decode(&method, &path, response).await
    }

    /// POST a JSON body and decode the response body
    pub async fn post<B, T>(self, body: &B) -> ConchResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let (method, path, response) = self.send(Method::POST, Some(body)).await?;
        decode(&method, &path, response).await
    }

    /// POST a JSON body, ignoring any response body
    pub async fn post_no_content<B>(self, body: &B) -> ConchResult<()>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, Some(body)).await?;
        Ok(())
    }

    /// PUT a JSON body and decode the response body
    pub async fn put<B, T>(self, body: &B) -> ConchResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let (method, path, response) = self.send(Method::PUT, Some(body)).await?;
        decode(&method, &path, response).await
    }

    /// DELETE, returning the success status for callers that require a
    /// specific one
    pub async fn delete(self) -> ConchResult<StatusCode> {
        let (_, _, response) = self.send(Method::DELETE, None).await?;
        Ok(response.status())
    }

    async fn send(
        self,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> ConchResult<(Method, String, Response)> {
        let path = self.path();
        let url = format!("{}{}", self.client.base_url(), path);
        debug!("{} {}", method, url);

        let mut request = self.client.http().request(method.clone(), &url);
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConchError::Transport(format!("{} {}: {}", method, path, e)))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            debug!("{} {} failed with {}", method, path, status);
            return Err(ConchError::Http {
                method: method.to_string(),
                path,
                status: status.as_u16(),
                body,
            });
        }

        Ok((method, path, response))
    }
}

async fn decode<T: DeserializeOwned>(
    method: &Method,
    path: &str,
    response: Response,
) -> ConchResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ConchError::Transport(format!("{} {}: {}", method, path, e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ConchError::Decode(format!("{} {}: {}", method, path, e)))
}
