use url::Url;

use crate::error::{Error, Result};

/// External application links must be absolute `https://` URLs with a host.
pub fn require_https_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::BadRequest(format!("external_url is not a valid URL: {}", e)))?;
    if url.scheme() != "https" {
        return Err(Error::BadRequest(format!(
            "external_url must use https, got {}",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::BadRequest("external_url has no host".to_string()));
    }
    Ok(url)
}

pub fn non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}
