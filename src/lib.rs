//! A client for driving the detail pane of a customer management page.
//!
//! The server renders customers as HTML fragments. This crate issues the
//! plain HTTP requests behind the page's delete and edit actions and splices
//! each returned fragment into a shared [`DetailPane`].

#![forbid(unsafe_code, clippy::unwrap_used)]
#![allow(clippy::needless_return)]
#![warn(clippy::await_holding_lock, clippy::inefficient_to_string)]

use parking_lot::RwLock;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use thiserror::Error;
use tracing::*;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
  #[error("HTTP status: {0}")]
  HttpStatus(StatusCode),

  #[error("InvalidUrl: {0}")]
  InvalidUrl(url::ParseError),

  #[error("Reqwest: {0}")]
  OtherReqwest(reqwest::Error),
}

impl From<reqwest::Error> for Error {
  fn from(err: reqwest::Error) -> Self {
    match err.status() {
      Some(code) => Self::HttpStatus(code),
      _ => Self::OtherReqwest(err),
    }
  }
}

/// Handle to the page region that renders a single customer.
///
/// A successful request replaces the previous contents wholesale, nothing is
/// merged. Handles are cheap to clone and all address the same surface, so
/// with several requests in flight the pane shows whichever response lands
/// last.
#[derive(Clone, Debug, Default)]
pub struct DetailPane {
  contents: Arc<RwLock<String>>,
}

impl DetailPane {
  pub fn new() -> DetailPane {
    return DetailPane::default();
  }

  /// The fragment currently on display.
  pub fn contents(&self) -> String {
    return self.contents.read().clone();
  }

  fn replace(&self, fragment: String) {
    *self.contents.write() = fragment;
  }
}

struct ClientState {
  client: reqwest::Client,
  url: url::Url,
  site: String,
}

impl ClientState {
  async fn fetch(&self, path: &str, method: Method) -> Result<reqwest::Response, Error> {
    assert!(path.starts_with("/"));

    let mut url = self.url.clone();
    url.set_path(path);

    let request = self
      .client
      .request(method, url)
      .headers(build_headers())
      .build()?;

    return Ok(self.client.execute(request).await?.error_for_status()?);
  }
}

/// Customer actions bound to the pane they render into.
///
/// Each action issues exactly one request and mutates the pane at most once,
/// only after the full response body arrived. There are no retries and no
/// request timeout.
#[derive(Clone)]
pub struct CustomerApi {
  client: Arc<ClientState>,
  pane: DetailPane,
}

impl CustomerApi {
  /// Deletes the customer resource at `path` and shows the confirmation
  /// fragment the server responds with.
  ///
  /// On failure the pane keeps its previous contents and the error is
  /// returned to the caller.
  pub async fn request_deletion(&self, path: &str) -> Result<(), Error> {
    match self.fragment(path, Method::DELETE).await {
      Ok(fragment) => {
        self.pane.replace(fragment);
        debug!("Deletion of {path} done");
        return Ok(());
      }
      Err(err) => {
        warn!("Deletion of {path} failed: {err}");
        return Err(err);
      }
    }
  }

  /// Fetches the edit form for the customer resource at `path` and shows it.
  ///
  /// On failure the pane keeps its previous contents and the error is
  /// returned to the caller.
  pub async fn request_modification_view(&self, path: &str) -> Result<(), Error> {
    match self.fragment(path, Method::GET).await {
      Ok(fragment) => {
        self.pane.replace(fragment);
        debug!("Modification view of {path} done");
        return Ok(());
      }
      Err(err) => {
        warn!("Modification view of {path} failed: {err}");
        return Err(err);
      }
    }
  }

  /// A handle to the pane this API renders into.
  pub fn pane(&self) -> DetailPane {
    return self.pane.clone();
  }

  async fn fragment(&self, path: &str, method: Method) -> Result<String, Error> {
    let response = self.client.fetch(path, method).await?;
    return Ok(response.text().await?);
  }
}

#[derive(Clone)]
pub struct Client {
  state: Arc<ClientState>,
}

impl Client {
  pub fn new(site: &str) -> Result<Client, Error> {
    return Ok(Client {
      state: Arc::new(ClientState {
        client: reqwest::Client::new(),
        url: url::Url::parse(site).map_err(Error::InvalidUrl)?,
        site: site.to_string(),
      }),
    });
  }

  pub fn site(&self) -> String {
    return self.state.site.clone();
  }

  /// Binds the customer actions to the given pane.
  pub fn customers(&self, pane: DetailPane) -> CustomerApi {
    return CustomerApi {
      client: self.state.clone(),
      pane,
    };
  }
}

fn build_headers() -> HeaderMap {
  let mut base = HeaderMap::with_capacity(1);
  base.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
  return base;
}
