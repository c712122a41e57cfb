//! HTTP-style response writers for error pages.

use std::io;

use http::StatusCode;

/// An output stream that also carries a response status.
pub trait ResponseWriter: io::Write {
    /// Set the response status. Called before any body bytes are written.
    fn write_status(&mut self, status: StatusCode);
}

impl<R: ResponseWriter + ?Sized> ResponseWriter for &mut R {
    fn write_status(&mut self, status: StatusCode) {
        (**self).write_status(status);
    }
}

/// Response collected in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl BufferedResponse {
    /// Empty `200 OK` response.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            body: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Convert into an [`http::Response`]. No headers are set.
    pub fn into_http(self) -> http::Response<Vec<u8>> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        response
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for BufferedResponse {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseWriter for BufferedResponse {
    fn write_status(&mut self, status: StatusCode) {
        self.status = status;
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for BufferedResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.body).into_response()
    }
}
