// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Delivery of serialized notifications.

use std::time::Duration;

use reqwest::header;

use crate::error::TransportError;

/// Content type of every posted body.
pub const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Sender of JSON bodies to the test monitor.
pub trait Transport {
    /// POSTs the JSON `body` to the `url` with the bearer `token`, returning
    /// the HTTP status code of the response.
    ///
    /// # Errors
    ///
    /// If the request couldn't be performed at all.
    fn post_json(
        &mut self,
        url: &str,
        body: &str,
        token: &str,
    ) -> Result<u16, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn post_json(
        &mut self,
        url: &str,
        body: &str,
        token: &str,
    ) -> Result<u16, TransportError> {
        (**self).post_json(url, body, token)
    }
}

/// [`Transport`] over a blocking [`reqwest`] client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Default timeout of a single request.
    pub const TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a new [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// If the underlying HTTP client fails to initialize.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &mut self,
        url: &str,
        body: &str,
        token: &str,
    ) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .header(header::CONNECTION, "close")
            .body(body.to_owned())
            .send()?;
        Ok(response.status().as_u16())
    }
}
