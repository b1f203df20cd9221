use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{error::CredentialsError, types::Credentials};

/// Reads client credentials from a two-line source.
///
/// The first non-empty line is the client id, the second the client secret.
/// Line terminators and surrounding whitespace are trimmed; anything after the
/// second value is ignored.
///
/// # Errors
///
/// - [`CredentialsError::Io`] if the source cannot be read
/// - [`CredentialsError::Empty`] if the source holds no values at all
/// - [`CredentialsError::MissingField`] if the client secret line is absent
///
/// # Example
///
/// ```
/// let creds = load_credentials("my-client-id\nmy-client-secret\n".as_bytes())?;
/// assert_eq!(creds.client_id, "my-client-id");
/// ```
pub fn load_credentials<R: BufRead>(source: R) -> Result<Credentials, CredentialsError> {
    let mut values = Vec::with_capacity(2);
    for line in source.lines() {
        let line = line?;
        let value = line.trim();
        if value.is_empty() {
            continue;
        }
        values.push(value.to_string());
        if values.len() == 2 {
            break;
        }
    }

    let mut values = values.into_iter();
    let client_id = values.next().ok_or(CredentialsError::Empty)?;
    let client_secret = values
        .next()
        .ok_or(CredentialsError::MissingField("client secret"))?;

    Ok(Credentials {
        client_id,
        client_secret,
    })
}

/// Reads client credentials from the secret file at `path`.
pub fn load_credentials_from_path(path: &Path) -> Result<Credentials, CredentialsError> {
    let file = File::open(path).map_err(|source| CredentialsError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "reading client credentials");
    load_credentials(BufReader::new(file))
}
