use crate::{AppState, error::AppError};
use attachments::{PublicOrigin, Upload};
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Host, Multipart, Request},
    http::request::Parts,
};
use std::collections::HashMap;
use std::sync::Arc;

/// A `multipart/form-data` body: text fields keyed by lower-cased name, plus
/// the optional `image` file.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    image: Option<Upload>,
}

impl FormData {
    /// The first of `names` present in the form. Names are matched
    /// case-insensitively.
    pub fn text(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| self.fields.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Like [`FormData::text`], with blank values treated as absent.
    pub fn non_blank(&self, names: &[&str]) -> Option<String> {
        self.text(names)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    }

    pub fn take_image(&mut self) -> Option<Upload> {
        self.image.take()
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await?;
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_ascii_lowercase();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    if name == "image" {
                        form.image = Some(Upload::new(file_name, bytes.to_vec()));
                    }
                }
                None => {
                    let value = field.text().await?;
                    form.fields.entry(name).or_insert(value);
                }
            }
        }

        Ok(form)
    }
}

/// Scheme and host the client used to reach us, for building image URLs.
///
/// The scheme comes from `X-Forwarded-Proto` when a proxy sets it, otherwise
/// from `server.default_scheme`.
#[derive(Debug, Clone)]
pub struct RequestOrigin(pub PublicOrigin);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestOrigin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Host(host) = Host::from_request_parts(parts, state).await?;
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| state.default_scheme.clone());

        Ok(RequestOrigin(PublicOrigin::new(scheme, host)))
    }
}
